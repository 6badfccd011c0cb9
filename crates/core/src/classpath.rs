//! Lazily cached view of the active classpath.
//!
//! Entries are read once, on first use, from the index's provider and kept
//! until [`ClasspathIndex::refresh`]. Lookups walk entries in classpath
//! order and compare canonical paths case-insensitively.

use crate::config::MatchPolicy;
use crate::path;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClasspathEntry {
    /// Absolute location of the entry.
    pub path: PathBuf,
    /// The entry as it appeared on the classpath.
    pub raw: String,
}

impl ClasspathEntry {
    /// Parses a raw classpath element, either a plain path or a `file:` URL.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let location = if trimmed.starts_with("file:") {
            let url = Url::parse(trimmed).ok()?;
            url.to_file_path().ok()?
        } else {
            PathBuf::from(trimmed)
        };
        let path = std::path::absolute(&location).unwrap_or(location);

        Some(Self {
            path,
            raw: raw.to_string(),
        })
    }

    /// Path with `/` separators, escapes left as they are on disk.
    pub fn canonical(&self) -> String {
        path::forward_slashes(&self.path.to_string_lossy())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn has_suffix(&self, suffixes: &[String]) -> bool {
        let name = self.file_name().to_lowercase();
        suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

type Provider = Box<dyn Fn() -> Vec<String> + Send + Sync>;

pub struct ClasspathIndex {
    provider: Provider,
    entries: OnceCell<Vec<ClasspathEntry>>,
    archive_suffixes: Vec<String>,
}

impl ClasspathIndex {
    /// Index over the `CLASSPATH` environment variable.
    pub fn from_env() -> Self {
        Self::with_provider(|| {
            std::env::var_os("CLASSPATH")
                .map(|cp| {
                    std::env::split_paths(&cp)
                        .map(|p| p.to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Index over a fixed list of raw entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = entries.into_iter().map(Into::into).collect();
        Self::with_provider(move || raw.clone())
    }

    pub fn with_provider(provider: impl Fn() -> Vec<String> + Send + Sync + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            entries: OnceCell::new(),
            archive_suffixes: vec![".jar".to_string(), ".zip".to_string()],
        }
    }

    pub fn with_archive_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.archive_suffixes = suffixes;
        self
    }

    /// Classpath entries, scanned on first call.
    pub fn entries(&self) -> &[ClasspathEntry] {
        self.entries.get_or_init(|| {
            let entries: Vec<ClasspathEntry> = (self.provider)()
                .iter()
                .filter_map(|raw| ClasspathEntry::from_raw(raw))
                .collect();
            debug!("Classpath scanned: {} entries", entries.len());
            entries
        })
    }

    /// Drops the cache; the next lookup re-scans.
    pub fn refresh(&mut self) {
        self.entries.take();
    }

    pub fn is_archive(&self, entry: &ClasspathEntry) -> bool {
        entry.has_suffix(&self.archive_suffixes)
    }

    pub fn archives(&self) -> impl Iterator<Item = &ClasspathEntry> {
        self.entries().iter().filter(|e| self.is_archive(e))
    }

    /// First entry whose path contains `text`.
    pub fn find_containing(&self, text: &str) -> Option<&ClasspathEntry> {
        let needle = needle(text);
        self.entries()
            .iter()
            .find(|e| e.canonical().to_lowercase().contains(&needle))
    }

    /// First archive entry whose path contains `text`.
    pub fn find_archive_containing(&self, text: &str) -> Option<&ClasspathEntry> {
        let needle = needle(text);
        self.archives()
            .find(|e| e.canonical().to_lowercase().contains(&needle))
    }

    /// First archive whose file name contains `artefact`.
    ///
    /// Names containing `4<artefact>` are skipped, so `opencv` does not pick
    /// up a `4opencv` wrapper archive.
    pub fn find_jar_named(&self, artefact: &str) -> Option<&ClasspathEntry> {
        let needle = needle(artefact);
        let wrapper = format!("4{}", needle);
        self.archives().find(|e| {
            let name = e.file_name().to_lowercase();
            name.contains(&needle) && !name.contains(&wrapper)
        })
    }

    /// First archive whose file name, with or without its suffix, equals
    /// `artefact`.
    pub fn find_jar_exact(&self, artefact: &str) -> Option<&ClasspathEntry> {
        let needle = needle(artefact);
        self.archives().find(|e| {
            let name = e.file_name().to_lowercase();
            name == needle
                || self
                    .archive_suffixes
                    .iter()
                    .any(|s| name.strip_suffix(s.as_str()) == Some(needle.as_str()))
        })
    }

    /// Archive lookup by name under the given policy.
    pub fn find_jar(&self, artefact: &str, policy: MatchPolicy) -> Option<&ClasspathEntry> {
        let exact = match policy {
            MatchPolicy::ExactFirst => self.find_jar_exact(artefact),
            MatchPolicy::FirstMatch => None,
        };
        exact
            .or_else(|| self.find_jar_named(artefact))
            .or_else(|| self.find_archive_containing(artefact))
    }

    /// Archive whose path contains `text` under the given policy.
    ///
    /// `ExactFirst` prefers an archive whose file name, with or without its
    /// suffix, equals the last segment of `text`.
    pub fn find_archive(&self, text: &str, policy: MatchPolicy) -> Option<&ClasspathEntry> {
        let exact = match policy {
            MatchPolicy::ExactFirst => {
                let (_, last) = path::split_last(path::trim_slashes(text));
                self.find_jar_exact(last)
            }
            MatchPolicy::FirstMatch => None,
        };
        exact.or_else(|| self.find_archive_containing(text))
    }

    /// `(position, entry)` pairs whose path contains `filter`; all entries
    /// for an empty filter.
    pub fn dump(&self, filter: &str) -> Vec<(usize, &ClasspathEntry)> {
        let needle = needle(filter);
        self.entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| needle.is_empty() || e.canonical().to_lowercase().contains(&needle))
            .collect()
    }
}

impl fmt::Debug for ClasspathIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClasspathIndex")
            .field("cached", &self.entries.get().map(|e| e.len()))
            .field("archive_suffixes", &self.archive_suffixes)
            .finish()
    }
}

fn needle(text: &str) -> String {
    path::forward_slashes(text).to_lowercase()
}
