use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Corrupt manifest {path}: {reason}")]
    CorruptManifest { path: String, reason: String },
    #[error("Cannot read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Directory cycle at {}", .path.display())]
    Cycle { path: PathBuf },
    #[error("Depth limit {limit} exceeded at {}", .path.display())]
    DepthExceeded { path: PathBuf, limit: usize },
    #[error("Origin is read-only: {0}")]
    ReadOnlyOrigin(String),
    #[error("Partial extraction: {failed} of {total} files failed")]
    PartialExtraction { failed: usize, total: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        ResourceError::ArchiveRead {
            path: path.into(),
            source,
        }
    }

    /// True for the kinds a caller is expected to recover from by falling back.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ResourceError::NotFound(_) | ResourceError::CorruptManifest { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;
