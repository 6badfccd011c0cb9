//! Depth-first listing of a directory tree.

use super::TreeWalker;
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{ResourceError, Result};
use crate::filter::ResourceFilter;
use crate::manifest::{Manifest, ManifestBuilder};
use crate::origin::ResourceOrigin;
use crate::path;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub struct DirectoryWalker {
    max_depth: usize,
    skip_name: Option<String>,
}

impl DirectoryWalker {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            skip_name: None,
        }
    }

    /// Leaves files with this name out of the listing.
    pub fn skipping(mut self, name: impl Into<String>) -> Self {
        self.skip_name = Some(name.into());
        self
    }

    /// Lists `root`. Files come before subfolders, each group by name.
    pub fn walk_dir(&self, root: &Path, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        if !root.is_dir() {
            return Err(ResourceError::NotFound(root.display().to_string()));
        }
        debug!("Scanning folder {}", root.display());

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by(files_first)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match (filter, path::relative_canonical(root, entry.path())) {
                    (Some(filter), Some(folder)) => filter.accept(&folder, ""),
                    _ => true,
                }
            });

        let mut builder = ManifestBuilder::rooted();
        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        let at = err.path().unwrap_or(root).to_path_buf();
                        warn!("Directory cycle at {}", at.display());
                        return Err(ResourceError::Cycle { path: at });
                    }
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if entry.depth() > self.max_depth {
                return Err(ResourceError::DepthExceeded {
                    path: entry.path().to_path_buf(),
                    limit: self.max_depth,
                });
            }

            let Some(relative) = path::relative_canonical(root, entry.path()) else {
                continue;
            };

            if entry.file_type().is_dir() {
                builder.enter(&relative);
                continue;
            }

            let (folder, name) = path::split_last(&relative);
            if self.skip_name.as_deref() == Some(name) {
                continue;
            }
            if let Some(filter) = filter {
                if !filter.accept(folder, name) {
                    continue;
                }
            }
            builder.file(folder, name);
        }

        Ok(builder.finish())
    }
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeWalker for DirectoryWalker {
    fn supports(&self, origin: &ResourceOrigin) -> bool {
        matches!(origin, ResourceOrigin::Directory(_))
    }

    fn walk(&self, origin: &ResourceOrigin, filter: Option<&dyn ResourceFilter>) -> Result<Manifest> {
        match origin {
            ResourceOrigin::Directory(dir) => self.walk_dir(dir, filter),
            other => Err(ResourceError::NotFound(format!(
                "{} is not a directory origin",
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        "Directory Walker"
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
