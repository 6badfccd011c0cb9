//! Resolution of logical roots to physical origins.
//!
//! A logical root is `[artefact!]/path/inside`. Unqualified roots are tried,
//! in order, as a directory under the working directory, as an absolute
//! directory, inside the reference container, by name on the classpath and
//! finally by content across all classpath entries.

use crate::classpath::{ClasspathEntry, ClasspathIndex};
use crate::config::ResourceConfig;
use crate::error::{ResourceError, Result};
use crate::host::{APPDATA_PLACEHOLDER, Host};
use crate::origin::ResourceOrigin;
use crate::path;
use crate::walker::archive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ResourceLocator {
    config: ResourceConfig,
    host: Arc<dyn Host>,
    classpath: ClasspathIndex,
}

impl ResourceLocator {
    pub fn new(config: ResourceConfig, host: Arc<dyn Host>, classpath: ClasspathIndex) -> Self {
        Self {
            config,
            host,
            classpath,
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn classpath(&self) -> &ClasspathIndex {
        &self.classpath
    }

    pub fn classpath_mut(&mut self) -> &mut ClasspathIndex {
        &mut self.classpath
    }

    /// Application-data directory, configured or asked from the host.
    pub fn app_data_dir(&self) -> PathBuf {
        self.config
            .app_data_dir
            .clone()
            .unwrap_or_else(|| self.host.app_data_dir())
    }

    /// Replaces the application-data placeholder.
    pub fn substitute(&self, logical_root: &str) -> String {
        if logical_root.contains(APPDATA_PLACEHOLDER) {
            let app_data = path::canonical_of(&self.app_data_dir());
            logical_root.replace(APPDATA_PLACEHOLDER, &app_data)
        } else {
            logical_root.to_string()
        }
    }

    /// Resolves `logical_root`. `reference` overrides the configured
    /// reference container for this call.
    pub fn resolve(&self, logical_root: &str, reference: Option<&Path>) -> Result<ResourceOrigin> {
        let substituted = self.substitute(logical_root);
        if path::trim_slashes(substituted.trim()).is_empty() {
            return Err(ResourceError::NotFound(format!(
                "empty logical root '{}'",
                logical_root
            )));
        }

        let (artefact, root) = split_qualifier(substituted.trim());
        let canonical = path::to_canonical(root);
        let relative = path::trim_slashes(&canonical).to_string();

        if let Some(artefact) = artefact {
            return self.resolve_qualified(artefact, &relative);
        }

        if let Some(dir) = self.find_directory(&canonical, &relative) {
            debug!("Resolved {} to directory {}", logical_root, dir.display());
            return Ok(ResourceOrigin::Directory(dir));
        }

        let reference = reference.or(self.config.reference.as_deref());
        if let Some(origin) = self.from_reference(reference, &relative)? {
            debug!("Resolved {} to {}", logical_root, origin);
            return Ok(origin);
        }

        if let Some(origin) = self.from_classpath(&relative) {
            debug!("Resolved {} to {}", logical_root, origin);
            return Ok(origin);
        }

        Err(ResourceError::NotFound(logical_root.to_string()))
    }

    fn resolve_qualified(&self, artefact: &str, relative: &str) -> Result<ResourceOrigin> {
        match self.classpath.find_jar(artefact, self.config.match_policy) {
            Some(entry) => Ok(ResourceOrigin::NestedArchive {
                entry: entry.clone(),
                prefix: relative.to_string(),
            }),
            None => Err(ResourceError::NotFound(format!(
                "no archive '{}' on the classpath",
                artefact
            ))),
        }
    }

    fn find_directory(&self, canonical: &str, relative: &str) -> Option<PathBuf> {
        let under_work_dir = path::native_join(&self.config.work_dir, relative);
        if under_work_dir.is_dir() {
            return Some(under_work_dir);
        }
        let absolute = PathBuf::from(path::to_os_native(canonical));
        if absolute.is_absolute() && absolute.is_dir() {
            return Some(absolute);
        }
        None
    }

    fn from_reference(&self, reference: Option<&Path>, relative: &str) -> Result<Option<ResourceOrigin>> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        if reference.is_dir() {
            let dir = path::native_join(reference, relative);
            return Ok(dir.is_dir().then_some(ResourceOrigin::Directory(dir)));
        }
        if reference.is_file() {
            if archive::archive_has_prefix(reference, relative)? {
                return Ok(Some(ResourceOrigin::ArchiveFile {
                    archive: reference.to_path_buf(),
                    prefix: relative.to_string(),
                }));
            }
            return Ok(None);
        }
        debug!("Reference {} does not exist", reference.display());
        Ok(None)
    }

    fn from_classpath(&self, relative: &str) -> Option<ResourceOrigin> {
        if let Some(entry) = self.classpath.find_archive(relative, self.config.match_policy) {
            // The root names the archive itself unless the archive also
            // holds a folder of that name.
            let prefix = if self.holds_prefix(entry, relative) {
                relative.to_string()
            } else {
                String::new()
            };
            return Some(ResourceOrigin::NestedArchive {
                entry: entry.clone(),
                prefix,
            });
        }

        for entry in self.classpath.entries() {
            if self.classpath.is_archive(entry) {
                if self.holds_prefix(entry, relative) {
                    return Some(ResourceOrigin::NestedArchive {
                        entry: entry.clone(),
                        prefix: relative.to_string(),
                    });
                }
            } else {
                let dir = path::native_join(&entry.path, relative);
                if dir.is_dir() {
                    return Some(ResourceOrigin::Directory(dir));
                }
            }
        }
        None
    }

    fn holds_prefix(&self, entry: &ClasspathEntry, relative: &str) -> bool {
        if !entry.path.is_file() {
            return false;
        }
        match archive::archive_has_prefix(&entry.path, relative) {
            Ok(found) => found,
            Err(e) => {
                warn!("Skipping unreadable classpath archive {}: {}", entry, e);
                false
            }
        }
    }
}

/// Splits `artefact!/path` into `(Some(artefact), "/path")`.
fn split_qualifier(root: &str) -> (Option<&str>, &str) {
    match root.split_once('!') {
        Some((artefact, rest)) if !artefact.is_empty() && !artefact.contains('/') => {
            (Some(artefact), rest)
        }
        _ => (None, root),
    }
}
