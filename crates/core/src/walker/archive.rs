//! Listing of a folder inside a zip-format archive.
//!
//! Archives do not promise that entries of one folder are stored next to
//! each other, so the walk runs in two phases: all entry names under the
//! prefix are buffered and bucketed by folder, then the buckets are
//! flattened into manifest order (root files first, then folders in order
//! of first appearance).

use super::TreeWalker;
use crate::error::{ResourceError, Result};
use crate::filter::{self, ResourceFilter};
use crate::manifest::{Manifest, ManifestBuilder};
use crate::origin::ResourceOrigin;
use crate::path;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

#[derive(Debug, Default)]
pub struct ArchiveWalker {
    skip_name: Option<String>,
}

impl ArchiveWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves files with this name out of the listing.
    pub fn skipping(mut self, name: impl Into<String>) -> Self {
        self.skip_name = Some(name.into());
        self
    }

    pub fn walk_archive(
        &self,
        archive: &Path,
        prefix: &str,
        filter: Option<&dyn ResourceFilter>,
    ) -> Result<Manifest> {
        debug!("Scanning archive {}!/{}", archive.display(), prefix);
        let names = list_archive_files(archive)?;
        let lead = folder_lead(prefix);

        let mut buckets: IndexMap<String, Vec<String>> = IndexMap::new();
        buckets.insert(String::new(), Vec::new());
        let mut folder_verdicts: HashMap<String, bool> = HashMap::new();

        for name in &names {
            let Some(relative) = name.strip_prefix(lead.as_str()) else {
                continue;
            };
            if relative.is_empty() {
                continue;
            }
            if !path::is_contained(relative) {
                warn!("Ignoring entry outside its folder: {}", name);
                continue;
            }

            let (folder, file) = path::split_last(relative);
            if self.skip_name.as_deref() == Some(file) {
                continue;
            }
            if let Some(filter) = filter {
                let folder_ok = *folder_verdicts
                    .entry(folder.to_string())
                    .or_insert_with(|| filter::accepts_folder(filter, folder));
                if !folder_ok || !filter.accept(folder, file) {
                    continue;
                }
            }
            buckets
                .entry(folder.to_string())
                .or_default()
                .push(file.to_string());
        }

        let mut builder = ManifestBuilder::rooted();
        for (folder, files) in &buckets {
            for file in files {
                builder.file(folder, file);
            }
        }
        Ok(builder.finish())
    }
}

impl TreeWalker for ArchiveWalker {
    fn supports(&self, origin: &ResourceOrigin) -> bool {
        origin.is_archive()
    }

    fn walk(&self, origin: &ResourceOrigin, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        match origin.archive_location() {
            Some((archive, prefix)) => self.walk_archive(archive, prefix, filter),
            None => Err(ResourceError::NotFound(format!(
                "{} is not an archive origin",
                origin
            ))),
        }
    }

    fn name(&self) -> &str {
        "Archive Walker"
    }
}

/// Names of all non-directory entries, canonical, in archive order.
pub fn list_archive_files(archive: &Path) -> Result<Vec<String>> {
    let mut zip = open(archive)?;
    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip
            .by_index_raw(i)
            .map_err(|e| ResourceError::archive(archive, e))?;
        let name = canonical_entry_name(entry.name());
        if entry.is_dir() || name.ends_with('/') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

/// Archive entry name with `\` separators turned into `/`.
pub(crate) fn canonical_entry_name(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// True when the archive holds at least one file under `prefix`.
pub fn archive_has_prefix(archive: &Path, prefix: &str) -> Result<bool> {
    let lead = folder_lead(prefix);
    Ok(list_archive_files(archive)?
        .iter()
        .any(|name| name.len() > lead.len() && name.starts_with(lead.as_str())))
}

pub(crate) fn open(archive: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ResourceError::NotFound(archive.display().to_string())
        } else {
            ResourceError::Io(e)
        }
    })?;
    ZipArchive::new(file).map_err(|e| ResourceError::archive(archive, e))
}

/// `"res"` becomes `"res/"`, the archive root stays `""`.
fn folder_lead(prefix: &str) -> String {
    let prefix = path::trim_slashes(prefix);
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use std::io::Write;

    fn write_archive(path: &Path, entries: &[&str]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for name in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(name.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_walk_groups_interleaved_entries() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("app.jar");
        write_archive(
            &jar,
            &[
                "res/",
                "res/sub/b.txt",
                "res/a.txt",
                "res/other/x.txt",
                "res/sub/c.txt",
                "other/ignored.txt",
            ],
        );

        let manifest = ArchiveWalker::new().walk_archive(&jar, "res", None).unwrap();
        assert_eq!(
            manifest.entries(),
            &[
                ManifestEntry::root(),
                ManifestEntry::file("a.txt"),
                ManifestEntry::marker("sub"),
                ManifestEntry::file("b.txt"),
                ManifestEntry::file("c.txt"),
                ManifestEntry::marker("other"),
                ManifestEntry::file("x.txt"),
            ]
        );
    }

    #[test]
    fn test_walk_archive_root() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("app.jar");
        write_archive(&jar, &["top.txt", "dir/inner.txt"]);

        let manifest = ArchiveWalker::new().walk_archive(&jar, "/", None).unwrap();
        assert_eq!(manifest.paths(), vec!["top.txt", "dir/inner.txt"]);
    }

    #[test]
    fn test_walk_applies_folder_filter_to_descendants() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("app.jar");
        write_archive(&jar, &["res/a.txt", "res/skip/b.txt", "res/skip/deep/c.txt"]);

        let filter = |folder: &str, _: &str| folder != "skip";
        let manifest = ArchiveWalker::new()
            .walk_archive(&jar, "res", Some(&filter))
            .unwrap();
        assert_eq!(manifest.paths(), vec!["a.txt"]);
    }

    #[test]
    fn test_unreadable_archive_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("broken.jar");
        std::fs::write(&jar, b"not a zip").unwrap();

        let err = ArchiveWalker::new().walk_archive(&jar, "res", None).unwrap_err();
        assert!(matches!(err, ResourceError::ArchiveRead { .. }));
    }

    #[test]
    fn test_archive_has_prefix() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("app.jar");
        write_archive(&jar, &["res/", "res/a.txt", "resources.txt"]);

        assert!(archive_has_prefix(&jar, "/res").unwrap());
        assert!(!archive_has_prefix(&jar, "resources").unwrap());
        assert!(!archive_has_prefix(&jar, "missing").unwrap());
    }
}
