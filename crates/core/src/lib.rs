pub mod error;
pub mod logging;

pub mod classpath;
pub mod config;
pub mod extract;
pub mod filter;
pub mod host;
pub mod locator;
pub mod manifest;
pub mod origin;
pub mod path;
pub mod service;
pub mod source;
pub mod walker;

pub use classpath::{ClasspathEntry, ClasspathIndex};
pub use config::{MatchPolicy, ResourceConfig};
pub use error::{ResourceError, Result};
pub use extract::{ExtractionReport, Extractor};
pub use filter::ResourceFilter;
pub use host::{Host, OsFamily, SystemHost};
pub use locator::ResourceLocator;
pub use manifest::{MANIFEST_FILE, Manifest, ManifestEntry, ManifestStore};
pub use origin::ResourceOrigin;
pub use service::{ResourceService, ResourceServiceBuilder};
pub use walker::{ArchiveWalker, DirectoryWalker, TreeWalker};
