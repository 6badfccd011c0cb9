//! Persisted manifests: loading from directories and archives, saving to
//! directories.

use super::{MANIFEST_FILE, Manifest};
use crate::error::{ResourceError, Result};
use crate::origin::ResourceOrigin;
use crate::source::{ArchiveSource, EntrySource};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// Reads and writes `sikulixcontent` files.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    file_name: String,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::with_file_name(MANIFEST_FILE)
    }

    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Loads the manifest co-located with `origin`.
    ///
    /// Returns `Ok(None)` when there is none, `CorruptManifest` when the
    /// file exists but breaks the line grammar.
    pub fn load(&self, origin: &ResourceOrigin) -> Result<Option<Manifest>> {
        match origin.archive_location() {
            Some((archive, prefix)) => self.load_from_archive(archive, prefix),
            None => self.load_from_dir(origin.path()),
        }
    }

    pub fn load_from_dir(&self, dir: &Path) -> Result<Option<Manifest>> {
        let file = dir.join(&self.file_name);
        if !file.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&file)?;
        debug!("Loaded manifest {}", file.display());
        self.checked(&file.to_string_lossy(), bytes).map(Some)
    }

    pub fn load_from_archive(&self, archive: &Path, prefix: &str) -> Result<Option<Manifest>> {
        let mut source = ArchiveSource::open(archive, prefix)?;
        let bytes = match source.read(&self.file_name) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ResourceError::Io(e)),
        };
        let location = source.describe(&self.file_name);
        debug!("Loaded manifest {}", location);
        self.checked(&location, bytes).map(Some)
    }

    /// Parses and validates manifest bytes; undecodable or malformed
    /// content is `CorruptManifest`.
    fn checked(&self, location: &str, bytes: Vec<u8>) -> Result<Manifest> {
        let corrupt = |reason: String| ResourceError::CorruptManifest {
            path: location.to_string(),
            reason,
        };
        let content = String::from_utf8(bytes).map_err(|e| corrupt(e.to_string()))?;
        let manifest = Manifest::parse_named(&content, &self.file_name);
        manifest.validate().map_err(corrupt)?;
        Ok(manifest)
    }

    /// Location a manifest for `dir` is saved to.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }

    /// Writes `manifest` into `dir` with the system line separator.
    ///
    /// Identical manifests always produce byte-identical files.
    pub fn save_to(&self, manifest: &Manifest, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let target = self.path_in(dir);
        let mut writer = BufWriter::new(File::create(&target)?);
        for entry in manifest {
            write!(writer, "{}{}", entry, LINE_SEPARATOR)?;
        }
        writer.flush()?;
        debug!(
            "Saved manifest ({} entries) to {}",
            manifest.len(),
            target.display()
        );
        Ok(target)
    }

    /// Writes `manifest` next to the resources of `origin`.
    ///
    /// Only directory origins are writable.
    pub fn save(&self, manifest: &Manifest, origin: &ResourceOrigin) -> Result<PathBuf> {
        match origin {
            ResourceOrigin::Directory(dir) => self.save_to(manifest, dir),
            other => {
                warn!("Refusing to write a manifest into {}", other);
                Err(ResourceError::ReadOnlyOrigin(other.to_string()))
            }
        }
    }

    /// A directory manifest is fresh when it is not older than its directory.
    pub fn is_fresh(&self, origin: &ResourceOrigin) -> bool {
        match origin {
            ResourceOrigin::Directory(dir) => {
                let manifest_time = std::fs::metadata(self.path_in(dir)).and_then(|m| m.modified());
                let dir_time = std::fs::metadata(dir).and_then(|m| m.modified());
                match (manifest_time, dir_time) {
                    (Ok(manifest_time), Ok(dir_time)) => manifest_time >= dir_time,
                    _ => false,
                }
            }
            _ => true,
        }
    }
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::new()
    }
}
