//! Materializes manifest-selected resources onto disk.

use crate::error::{ResourceError, Result};
use crate::filter::{self, ResourceFilter};
use crate::manifest::{Manifest, ManifestEntry};
use crate::origin::ResourceOrigin;
use crate::path;
use crate::source::{self, EntrySource};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    /// Canonical path relative to the origin root.
    pub entry: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub copied: Vec<PathBuf>,
    /// Entries rejected by the filter.
    pub skipped: Vec<String>,
    pub failed: Vec<ExtractionFailure>,
}

impl ExtractionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.copied.len() + self.failed.len()
    }

    /// Turns recorded failures into [`ResourceError::PartialExtraction`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ResourceError::PartialExtraction {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Copies files listed in a manifest from an origin into a target directory.
///
/// Extraction is best-effort: a file that cannot be copied is recorded in
/// [`ExtractionReport::failed`] and the remaining files are still copied.
/// Existing destination files are overwritten.
#[derive(Debug, Default, Clone)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(
        &self,
        manifest: &Manifest,
        origin: &ResourceOrigin,
        target_dir: &Path,
        filter: Option<&dyn ResourceFilter>,
    ) -> Result<ExtractionReport> {
        let mut source = source::open_source(origin)?;
        fs::create_dir_all(target_dir)?;
        debug!("Extracting {} into {}", origin, target_dir.display());

        let mut report = ExtractionReport::default();
        let mut folder = "";
        let mut folder_ok = true;

        for entry in manifest {
            match entry {
                ManifestEntry::Directory(marker) => {
                    folder = marker.as_str();
                    folder_ok = filter.is_none_or(|f| filter::accepts_folder(f, folder));
                    if folder_ok && !folder.is_empty() && path::is_contained(folder) {
                        let dir = path::native_join(target_dir, folder);
                        if let Err(e) = fs::create_dir_all(&dir) {
                            warn!("Cannot create {}: {}", dir.display(), e);
                        }
                    }
                }
                ManifestEntry::File(name) => {
                    let relative = path::join_canonical(&[folder, name]);
                    if !folder_ok || filter.is_some_and(|f| !f.accept(folder, name)) {
                        report.skipped.push(relative);
                        continue;
                    }
                    if !path::is_contained(&relative) || name.contains('\\') {
                        warn!("Refusing to extract {} outside the target", relative);
                        report.failed.push(ExtractionFailure {
                            entry: relative,
                            error: "path escapes the target directory".to_string(),
                        });
                        continue;
                    }

                    let dest = path::native_join(target_dir, &relative);
                    match copy_one(source.as_mut(), &relative, &dest) {
                        Ok(bytes) => {
                            debug!("Copied {} ({} bytes)", relative, bytes);
                            report.copied.push(dest);
                        }
                        Err(e) => {
                            warn!("Failed to extract {}: {}", source.describe(&relative), e);
                            report.failed.push(ExtractionFailure {
                                entry: relative,
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        info!(
            "Extracted {} files into {} ({} skipped, {} failed)",
            report.copied.len(),
            target_dir.display(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// Copies one resource. A partly written destination is removed on error.
pub(crate) fn copy_one(source: &mut dyn EntrySource, relative: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let written = write_dest(source, relative, dest);
    if written.is_err() && dest.exists() {
        if let Err(e) = fs::remove_file(dest) {
            warn!("Cannot remove partial file {}: {}", dest.display(), e);
        }
    }
    written
}

fn write_dest(source: &mut dyn EntrySource, relative: &str, dest: &Path) -> Result<u64> {
    let mut out = BufWriter::new(File::create(dest)?);
    let bytes = source.copy_into(relative, &mut out)?;
    out.flush()?;
    Ok(bytes)
}
