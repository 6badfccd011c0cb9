//! Compact resource listing ("manifest").
//!
//! A manifest is an ordered list of lines. A line ending in `/` is a
//! directory marker; every other line is a bare file name that belongs to
//! the most recent marker. The first line is always the root marker `/`.
//!
//! ```text
//! /
//! a.txt
//! sub/
//! b.txt
//! ```

pub mod store;

pub use store::ManifestStore;

use crate::filter::ResourceFilter;
use crate::path;
use serde::Serialize;
use std::fmt;

/// File name of a persisted manifest.
pub const MANIFEST_FILE: &str = "sikulixcontent";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ManifestEntry {
    /// Canonical folder relative to the walked root, without trailing `/`.
    /// The root folder is `""`.
    Directory(String),
    File(String),
}

impl ManifestEntry {
    pub fn root() -> Self {
        ManifestEntry::Directory(String::new())
    }

    pub fn marker(folder: impl AsRef<str>) -> Self {
        ManifestEntry::Directory(path::trim_slashes(folder.as_ref()).to_string())
    }

    pub fn file(name: impl Into<String>) -> Self {
        ManifestEntry::File(name.into())
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, ManifestEntry::Directory(_))
    }

    /// Parses one manifest line. Empty lines yield `None`.
    ///
    /// Only a trailing `\r` is stripped, names keep surrounding whitespace.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return None;
        }
        if line == "/" {
            return Some(ManifestEntry::root());
        }
        match line.strip_suffix('/') {
            Some(folder) => Some(ManifestEntry::Directory(folder.to_string())),
            None => Some(ManifestEntry::File(line.to_string())),
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestEntry::Directory(folder) if folder.is_empty() => f.write_str("/"),
            ManifestEntry::Directory(folder) => write!(f, "{}/", folder),
            ManifestEntry::File(name) => f.write_str(name),
        }
    }
}

/// A file line together with the folder that scopes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedFile<'a> {
    pub folder: &'a str,
    pub name: &'a str,
}

impl ScopedFile<'_> {
    /// Canonical path relative to the walked root.
    pub fn relative_path(&self) -> String {
        path::join_canonical(&[self.folder, self.name])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// A manifest holding only the root marker.
    pub fn empty() -> Self {
        Self {
            entries: vec![ManifestEntry::root()],
        }
    }

    /// Wraps entries without validating them; see [`Manifest::validate`].
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_marker()).count()
    }

    /// Walks the manifest with a "current folder" cursor.
    pub fn files(&self) -> Files<'_> {
        Files {
            entries: self.entries.iter(),
            folder: "",
        }
    }

    /// Every distinct folder marker, in order of first appearance.
    pub fn folders(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if let ManifestEntry::Directory(folder) = entry {
                if !seen.contains(&folder.as_str()) {
                    seen.push(folder.as_str());
                }
            }
        }
        seen
    }

    /// `(folder, name)` pairs in manifest order.
    pub fn flatten(&self) -> Vec<(String, String)> {
        self.files()
            .map(|f| (f.folder.to_string(), f.name.to_string()))
            .collect()
    }

    /// Non-compact listing: one `folder/name` per file.
    pub fn paths(&self) -> Vec<String> {
        self.files().map(|f| f.relative_path()).collect()
    }

    /// Re-scopes the manifest through `filter`, dropping rejected folders
    /// (with their subtrees) and rejected files.
    pub fn filtered(&self, filter: &dyn ResourceFilter) -> Manifest {
        let mut builder = ManifestBuilder::rooted();
        let mut pruned = false;
        let mut folder = "";
        for entry in &self.entries {
            match entry {
                ManifestEntry::Directory(f) => {
                    folder = f.as_str();
                    pruned = !crate::filter::accepts_folder(filter, folder);
                    if !pruned {
                        builder.enter(folder);
                    }
                }
                ManifestEntry::File(name) => {
                    if !pruned && filter.accept(folder, name) {
                        builder.file(folder, name);
                    }
                }
            }
        }
        builder.finish()
    }

    /// Checks the line grammar and scoping rules.
    pub fn validate(&self) -> Result<(), String> {
        match self.entries.first() {
            Some(ManifestEntry::Directory(folder)) if folder.is_empty() => {}
            Some(other) => return Err(format!("first entry must be '/', found '{}'", other)),
            None => return Err("manifest is empty".to_string()),
        }

        for (idx, entry) in self.entries.iter().enumerate() {
            match entry {
                ManifestEntry::Directory(folder) => {
                    if !folder.is_empty() && !path::is_contained(folder) {
                        return Err(format!("line {}: invalid directory marker '{}'", idx + 1, entry));
                    }
                }
                ManifestEntry::File(name) => {
                    if name.is_empty()
                        || name.contains('/')
                        || name.contains('\\')
                        || name == "."
                        || name == ".."
                    {
                        return Err(format!(
                            "line {}: '{}' is not a bare file name",
                            idx + 1,
                            name
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialized lines, separated by `separator`, with a trailing separator.
    pub fn render(&self, separator: &str) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push_str(separator);
        }
        out
    }

    /// Parses manifest text, ignoring empty lines and self-references to the
    /// manifest file. The result is not validated.
    pub fn parse(content: &str) -> Manifest {
        Self::parse_named(content, MANIFEST_FILE)
    }

    /// Like [`Manifest::parse`] for a manifest stored as `manifest_name`.
    pub fn parse_named(content: &str, manifest_name: &str) -> Manifest {
        let entries = content
            .lines()
            .filter_map(ManifestEntry::parse_line)
            .filter(|entry| !matches!(entry, ManifestEntry::File(name) if name == manifest_name))
            .collect();
        Manifest { entries }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Cursor over the file lines of a manifest.
pub struct Files<'a> {
    entries: std::slice::Iter<'a, ManifestEntry>,
    folder: &'a str,
}

impl<'a> Iterator for Files<'a> {
    type Item = ScopedFile<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            match entry {
                ManifestEntry::Directory(folder) => self.folder = folder.as_str(),
                ManifestEntry::File(name) => {
                    return Some(ScopedFile {
                        folder: self.folder,
                        name,
                    });
                }
            }
        }
        None
    }
}

/// Scope state machine shared by the walkers.
///
/// Markers are emitted only when the scope changes, so returning to a
/// parent folder re-emits its marker exactly when a following file needs it.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    entries: Vec<ManifestEntry>,
    scope: Option<String>,
}

impl ManifestBuilder {
    /// A builder whose first entry is the root marker.
    pub fn rooted() -> Self {
        let mut builder = Self::default();
        builder.enter("");
        builder
    }

    /// Moves the scope to `folder`, emitting its marker if the scope changed.
    pub fn enter(&mut self, folder: &str) {
        if self.scope.as_deref() == Some(folder) {
            return;
        }
        self.entries.push(ManifestEntry::marker(folder));
        self.scope = Some(folder.to_string());
    }

    pub fn file(&mut self, folder: &str, name: &str) {
        self.enter(folder);
        self.entries.push(ManifestEntry::file(name));
    }

    pub fn finish(self) -> Manifest {
        Manifest {
            entries: self.entries,
        }
    }
}
