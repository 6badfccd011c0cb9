use crate::classpath::ClasspathEntry;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Physical container backing a logical root. Created per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum ResourceOrigin {
    /// A plain directory holding the subtree.
    Directory(std::path::PathBuf),
    /// A packaged archive; `prefix` is the canonical folder inside it
    /// (no leading slash, empty for the archive root).
    ArchiveFile {
        archive: std::path::PathBuf,
        prefix: String,
    },
    /// An archive found by scanning the classpath.
    NestedArchive { entry: ClasspathEntry, prefix: String },
}

impl ResourceOrigin {
    /// Directory, archive file or classpath archive path.
    pub fn path(&self) -> &Path {
        match self {
            ResourceOrigin::Directory(dir) => dir,
            ResourceOrigin::ArchiveFile { archive, .. } => archive,
            ResourceOrigin::NestedArchive { entry, .. } => &entry.path,
        }
    }

    /// `(archive, prefix)` for archive-backed origins.
    pub fn archive_location(&self) -> Option<(&Path, &str)> {
        match self {
            ResourceOrigin::Directory(_) => None,
            ResourceOrigin::ArchiveFile { archive, prefix } => Some((archive, prefix)),
            ResourceOrigin::NestedArchive { entry, prefix } => Some((&entry.path, prefix)),
        }
    }

    pub fn is_archive(&self) -> bool {
        self.archive_location().is_some()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceOrigin::Directory(_) => "directory",
            ResourceOrigin::ArchiveFile { .. } => "archive",
            ResourceOrigin::NestedArchive { .. } => "classpath-archive",
        }
    }
}

impl fmt::Display for ResourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.archive_location() {
            Some((archive, prefix)) => write!(f, "{} {}!/{}", self.kind(), archive.display(), prefix),
            None => write!(f, "{} {}", self.kind(), self.path().display()),
        }
    }
}
