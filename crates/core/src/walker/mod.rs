//! Tree walkers turn an origin into a [`Manifest`].
//!
//! ```text
//! ResourceOrigin ──▶ TreeWalker::supports ──▶ TreeWalker::walk ──▶ Manifest
//!   Directory            DirectoryWalker         depth-first descent
//!   ArchiveFile   ┐
//!   NestedArchive ┘      ArchiveWalker           buffer, group, flatten
//! ```

pub mod archive;
pub mod directory;

pub use archive::ArchiveWalker;
pub use directory::DirectoryWalker;

use crate::error::Result;
use crate::filter::ResourceFilter;
use crate::manifest::Manifest;
use crate::origin::ResourceOrigin;

pub trait TreeWalker: Send + Sync {
    /// Whether this walker understands the origin's storage.
    fn supports(&self, origin: &ResourceOrigin) -> bool;

    /// Lists the subtree. The first entry of the result is always `/`.
    fn walk(&self, origin: &ResourceOrigin, filter: Option<&dyn ResourceFilter>) -> Result<Manifest>;

    /// Walker name (for logging/debugging)
    fn name(&self) -> &str;
}

/// The walkers every service starts with.
pub fn default_walkers(manifest_name: &str, max_depth: usize) -> Vec<Box<dyn TreeWalker>> {
    vec![
        Box::new(DirectoryWalker::new(max_depth).skipping(manifest_name)),
        Box::new(ArchiveWalker::new().skipping(manifest_name)),
    ]
}
