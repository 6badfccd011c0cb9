//! Resource service facade.
//!
//! Ties the locator, manifest store, walkers and extractor together:
//! - `resolve` a logical root to its origin
//! - `list` it, reusing a fresh persisted manifest when there is one
//! - `extract` it (or a single file) into a directory

use crate::classpath::ClasspathIndex;
use crate::config::ResourceConfig;
use crate::error::{ResourceError, Result};
use crate::extract::{self, ExtractionReport, Extractor};
use crate::filter::ResourceFilter;
use crate::host::{Host, SystemHost};
use crate::locator::ResourceLocator;
use crate::manifest::{Manifest, ManifestStore};
use crate::origin::ResourceOrigin;
use crate::path;
use crate::source;
use crate::walker::{self, TreeWalker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Logical root of the bundled pattern-recognition data.
pub const PATTERN_DATA_ROOT: &str = "/sikulixtessdata";

pub struct ResourceService {
    locator: ResourceLocator,
    store: ManifestStore,
    walkers: Vec<Box<dyn TreeWalker>>,
    extractor: Extractor,
}

impl ResourceService {
    pub fn new(config: ResourceConfig) -> Self {
        ResourceServiceBuilder::new().with_config(config).build()
    }

    pub fn config(&self) -> &ResourceConfig {
        self.locator.config()
    }

    pub fn classpath(&self) -> &ClasspathIndex {
        self.locator.classpath()
    }

    /// Re-scans the classpath on next use.
    pub fn refresh_classpath(&mut self) {
        self.locator.classpath_mut().refresh();
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn resolve(&self, logical_root: &str) -> Result<ResourceOrigin> {
        self.locator.resolve(logical_root, None)
    }

    /// Resolves against an explicit reference container.
    pub fn resolve_from(&self, logical_root: &str, reference: &Path) -> Result<ResourceOrigin> {
        self.locator.resolve(logical_root, Some(reference))
    }

    /// Walks `origin` with the first walker that supports it.
    pub fn walk(&self, origin: &ResourceOrigin, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        let walker = self
            .walkers
            .iter()
            .find(|w| w.supports(origin))
            .ok_or_else(|| ResourceError::NotFound(format!("no walker for {}", origin)))?;
        debug!("{} walking {}", walker.name(), origin);
        walker.walk(origin, filter)
    }

    /// Manifest of `origin`: the persisted one when present and fresh,
    /// a physical walk otherwise.
    pub fn manifest_of(&self, origin: &ResourceOrigin, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        match self.store.load(origin) {
            Ok(Some(manifest)) if self.store.is_fresh(origin) => {
                debug!("Using persisted manifest of {}", origin);
                return Ok(match filter {
                    Some(filter) => manifest.filtered(filter),
                    None => manifest,
                });
            }
            Ok(Some(_)) => info!("Persisted manifest of {} is stale, walking", origin),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => warn!("{}, walking instead", e),
            Err(e) => return Err(e),
        }
        self.walk(origin, filter)
    }

    pub fn list(&self, logical_root: &str, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        let origin = self.resolve(logical_root)?;
        self.manifest_of(&origin, filter)
    }

    /// One `folder/name` line per file.
    pub fn list_paths(&self, logical_root: &str, filter: Option<&dyn ResourceFilter>) -> Result<Vec<String>> {
        Ok(self.list(logical_root, filter)?.paths())
    }

    /// Extracts the subtree under `logical_root` into `target_dir`.
    pub fn extract(
        &self,
        logical_root: &str,
        target_dir: &Path,
        filter: Option<&dyn ResourceFilter>,
    ) -> Result<ExtractionReport> {
        let origin = self.resolve(logical_root)?;
        self.extract_origin(&origin, target_dir, filter)
    }

    pub fn extract_origin(
        &self,
        origin: &ResourceOrigin,
        target_dir: &Path,
        filter: Option<&dyn ResourceFilter>,
    ) -> Result<ExtractionReport> {
        let manifest = self.manifest_of(origin, None)?;
        let report = self.extractor.extract(&manifest, origin, target_dir, filter)?;
        if self.config().persist_manifest && report.is_success() {
            let extracted = match filter {
                Some(filter) => manifest.filtered(filter),
                None => manifest,
            };
            // Files are already copied, a failed save is only logged.
            if let Err(e) = self.store.save_to(&extracted, target_dir) {
                warn!("Cannot persist manifest into {}: {}", target_dir.display(), e);
            }
        }
        Ok(report)
    }

    /// Walks `logical_root` and persists its manifest into `target_dir`.
    pub fn export_manifest(
        &self,
        logical_root: &str,
        target_dir: &Path,
        filter: Option<&dyn ResourceFilter>,
    ) -> Result<PathBuf> {
        let origin = self.resolve(logical_root)?;
        let manifest = self.walk(&origin, filter)?;
        self.store.save_to(&manifest, target_dir)
    }

    /// Reads one resource as UTF-8. `file` is relative to the root.
    pub fn read_to_string(&self, logical_root: &str, file: &str) -> Result<String> {
        let origin = self.resolve(logical_root)?;
        let relative = contained(file)?;
        let mut source = source::open_source(&origin)?;
        let bytes = source::read_entry(source.as_mut(), &relative)?;
        String::from_utf8(bytes).map_err(|e| {
            ResourceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// Copies one resource into `target_dir`, optionally under another name.
    pub fn extract_file(
        &self,
        logical_root: &str,
        file: &str,
        target_dir: &Path,
        rename: Option<&str>,
    ) -> Result<PathBuf> {
        let origin = self.resolve(logical_root)?;
        let relative = contained(file)?;
        let (_, name) = path::split_last(&relative);
        let dest = target_dir.join(rename.unwrap_or(name));

        let mut source = source::open_source(&origin)?;
        extract::copy_one(source.as_mut(), &relative, &dest).map_err(|e| match e {
            ResourceError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                ResourceError::NotFound(source.describe(&relative))
            }
            other => other,
        })?;
        debug!("Exported {} to {}", relative, dest.display());
        Ok(dest)
    }

    /// Extracts the native libraries bundled for the host OS.
    pub fn export_native_libs(&self, target_dir: &Path) -> Result<ExtractionReport> {
        let root = self.locator.host().os_family().native_libs_root();
        self.extract(&root, target_dir, None)
    }

    pub fn export_pattern_data(&self, target_dir: &Path) -> Result<ExtractionReport> {
        self.extract(PATTERN_DATA_ROOT, target_dir, None)
    }
}

fn contained(file: &str) -> Result<String> {
    let canonical = path::to_canonical(file);
    let relative = path::trim_slashes(&canonical);
    if relative.is_empty() || !path::is_contained(relative) {
        return Err(ResourceError::NotFound(format!("invalid resource path '{}'", file)));
    }
    Ok(relative.to_string())
}

/// Builder for ResourceService
pub struct ResourceServiceBuilder {
    config: ResourceConfig,
    host: Option<Arc<dyn Host>>,
    classpath: Option<ClasspathIndex>,
    walkers: Vec<Box<dyn TreeWalker>>,
}

impl ResourceServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: ResourceConfig::default(),
            host: None,
            classpath: None,
            walkers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_classpath(mut self, classpath: ClasspathIndex) -> Self {
        self.classpath = Some(classpath);
        self
    }

    /// Walkers added here are consulted before the built-in ones.
    pub fn add_walker(mut self, walker: Box<dyn TreeWalker>) -> Self {
        self.walkers.push(walker);
        self
    }

    pub fn build(self) -> ResourceService {
        let config = self.config;
        let host = self.host.unwrap_or_else(|| Arc::new(SystemHost));
        let classpath = self
            .classpath
            .unwrap_or_else(ClasspathIndex::from_env)
            .with_archive_suffixes(config.archive_suffixes.clone());

        let mut walkers = self.walkers;
        walkers.extend(walker::default_walkers(&config.manifest_name, config.max_depth));

        ResourceService {
            store: ManifestStore::with_file_name(config.manifest_name.clone()),
            locator: ResourceLocator::new(config, host, classpath),
            walkers,
            extractor: Extractor::new(),
        }
    }
}

impl Default for ResourceServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedHost;
    use crate::manifest::ManifestEntry;
    use std::fs;

    struct FixedWalker;

    impl TreeWalker for FixedWalker {
        fn supports(&self, _: &ResourceOrigin) -> bool {
            true
        }

        fn walk(&self, _: &ResourceOrigin, _: Option<&dyn ResourceFilter>) -> Result<Manifest> {
            Ok(Manifest::from_entries(vec![
                ManifestEntry::root(),
                ManifestEntry::file("fixed.txt"),
            ]))
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    fn service_in(dir: &Path) -> ResourceServiceBuilder {
        ResourceServiceBuilder::new()
            .with_config(ResourceConfig::default().with_work_dir(dir))
            .with_host(Arc::new(FixedHost::new(dir.join("appdata"))))
            .with_classpath(ClasspathIndex::from_entries(Vec::<String>::new()))
    }

    #[test]
    fn test_builder_prefers_added_walkers() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("res")).unwrap();
        let service = service_in(temp.path()).add_walker(Box::new(FixedWalker)).build();

        assert_eq!(service.list_paths("/res", None).unwrap(), vec!["fixed.txt"]);
    }

    #[test]
    fn test_stale_manifest_is_replaced_by_walk() {
        let temp = tempfile::tempdir().unwrap();
        let res = temp.path().join("res");
        fs::create_dir(&res).unwrap();
        fs::write(res.join("a.txt"), "a").unwrap();
        let service = service_in(temp.path()).build();

        // A corrupt manifest falls back to a walk
        fs::write(res.join("sikulixcontent"), "a.txt\n").unwrap();
        assert_eq!(service.list_paths("/res", None).unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_undecodable_manifest_falls_back_to_walk() {
        let temp = tempfile::tempdir().unwrap();
        let res = temp.path().join("res");
        fs::create_dir(&res).unwrap();
        fs::write(res.join("a.txt"), "a").unwrap();
        fs::write(res.join("sikulixcontent"), [0xFF, 0xFE, b'\n']).unwrap();
        let service = service_in(temp.path()).build();

        assert_eq!(service.list_paths("/res", None).unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_unwritable_manifest_keeps_extraction_report() {
        let temp = tempfile::tempdir().unwrap();
        let res = temp.path().join("res");
        fs::create_dir_all(res.join("sub")).unwrap();
        fs::write(res.join("a.txt"), "a").unwrap();
        fs::write(res.join("sub").join("b.txt"), "b").unwrap();
        let service = service_in(temp.path()).build();

        // A directory in the manifest's place makes the save fail
        let target = temp.path().join("out");
        fs::create_dir_all(target.join("sikulixcontent")).unwrap();

        let report = service.extract("/res", &target, None).unwrap();
        assert!(report.is_success());
        assert_eq!(report.copied.len(), 2);
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(target.join("sub").join("b.txt")).unwrap(), "b");
        assert!(target.join("sikulixcontent").is_dir());
    }

    #[test]
    fn test_read_to_string_rejects_escaping_paths() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("res")).unwrap();
        fs::write(temp.path().join("secret.txt"), "s").unwrap();
        let service = service_in(temp.path()).build();

        let err = service.read_to_string("/res", "../secret.txt").unwrap_err();
        assert!(matches!(err, ResourceError::NotFound(_)));
    }
}
