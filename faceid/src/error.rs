use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by faceid operations.
#[derive(Debug, Error)]
pub enum FaceIdError {
    #[error("extract error: {0}")]
    Extract(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("empty embedding")]
    EmptyEmbedding,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("grouping run is {actual}, expected {expected}")]
    Phase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(String),
}

impl FaceIdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for faceid operations.
pub type Result<T> = std::result::Result<T, FaceIdError>;
