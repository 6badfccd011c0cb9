//! Listing filters.
//!
//! A filter is asked about files as `(folder, name)` and about folders as
//! `(folder, "")`. `folder` is canonical and relative to the walked root,
//! `""` meaning the root itself. Rejecting a folder prunes its subtree.

use regex::Regex;

pub trait ResourceFilter {
    fn accept(&self, folder: &str, name: &str) -> bool;
}

impl<F> ResourceFilter for F
where
    F: Fn(&str, &str) -> bool,
{
    fn accept(&self, folder: &str, name: &str) -> bool {
        self(folder, name)
    }
}

/// True when `folder` and all of its ancestors are accepted.
pub fn accepts_folder(filter: &dyn ResourceFilter, folder: &str) -> bool {
    if folder.is_empty() {
        return true;
    }
    let mut end = 0;
    for (idx, segment) in folder.split('/').enumerate() {
        end += segment.len() + usize::from(idx > 0);
        if !filter.accept(&folder[..end], "") {
            return false;
        }
    }
    true
}

/// Rejects files whose name ends with any of `suffixes`.
pub struct ExcludeSuffixes(Vec<String>);

impl ResourceFilter for ExcludeSuffixes {
    fn accept(&self, _folder: &str, name: &str) -> bool {
        name.is_empty() || !self.0.iter().any(|s| name.ends_with(s.as_str()))
    }
}

pub fn exclude_suffixes<I, S>(suffixes: I) -> ExcludeSuffixes
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ExcludeSuffixes(suffixes.into_iter().map(Into::into).collect())
}

/// Accepts files whose name contains the given text; folders pass.
pub struct NameContains(String);

impl ResourceFilter for NameContains {
    fn accept(&self, _folder: &str, name: &str) -> bool {
        name.is_empty() || name.contains(self.0.as_str())
    }
}

pub fn name_contains(text: impl Into<String>) -> NameContains {
    NameContains(text.into())
}

/// Accepts files whose root-relative path matches a regex; folders pass.
pub struct Matching(Regex);

impl ResourceFilter for Matching {
    fn accept(&self, folder: &str, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }
        if folder.is_empty() {
            self.0.is_match(name)
        } else {
            self.0.is_match(&format!("{}/{}", folder, name))
        }
    }
}

pub fn matching(pattern: Regex) -> Matching {
    Matching(pattern)
}

/// Every inner filter must accept.
pub struct All<'a>(pub Vec<&'a dyn ResourceFilter>);

impl ResourceFilter for All<'_> {
    fn accept(&self, folder: &str, name: &str) -> bool {
        self.0.iter().all(|f| f.accept(folder, name))
    }
}
