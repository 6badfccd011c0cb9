//! Conversions between OS-native, percent-encoded and canonical paths.
//!
//! A canonical path uses `/` as its only separator and carries no
//! percent-escapes. Archive entry names, manifest lines and logical roots
//! are all compared in canonical form.

use std::borrow::Cow;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

/// Converts a path string to canonical form.
///
/// Decodes UTF-8 percent-escapes, replaces the OS separator with `/` and
/// drops leading `./` segments. Malformed escapes are kept verbatim.
pub fn to_canonical(path: &str) -> String {
    let decoded: Cow<'_, str> = if path.contains('%') {
        match urlencoding::decode(path) {
            Ok(decoded) => decoded,
            Err(_) => Cow::Borrowed(path),
        }
    } else {
        Cow::Borrowed(path)
    };

    let mut canonical = if MAIN_SEPARATOR != '/' {
        decoded.replace(MAIN_SEPARATOR, "/")
    } else {
        decoded.into_owned()
    };

    while canonical.starts_with("./") {
        canonical.replace_range(..2, "");
    }
    canonical
}

/// Replaces the OS separator with `/` and nothing else; percent signs stay.
pub fn forward_slashes(path: &str) -> String {
    if MAIN_SEPARATOR != '/' {
        path.replace(MAIN_SEPARATOR, "/")
    } else {
        path.to_string()
    }
}

/// Inverse of [`to_canonical`]'s separator substitution.
pub fn to_os_native(path: &str) -> String {
    if MAIN_SEPARATOR != '/' {
        path.replace('/', &MAIN_SEPARATOR.to_string())
    } else {
        path.to_string()
    }
}

/// Canonical form of an on-disk path.
pub fn canonical_of(path: &Path) -> String {
    to_canonical(&path.to_string_lossy())
}

/// Strips leading and trailing slashes from a canonical path.
///
/// `"/res/sub/"` becomes `"res/sub"`, `"/"` becomes `""`.
pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// Joins a canonical relative path onto a native base, segment by segment.
pub fn native_join(base: &Path, relative: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        joined.push(segment);
    }
    joined
}

/// Joins canonical segments, skipping empty ones.
pub fn join_canonical(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| trim_slashes(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical path of `path` relative to `root`, or `None` when `path` is not
/// below `root`. The root itself maps to `""`.
pub fn relative_canonical(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(segments.join("/"))
}

/// Splits a canonical relative path at its last `/` into `(folder, name)`.
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// True when a canonical relative path stays inside its root.
pub fn is_contained(path: &str) -> bool {
    !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
