//! Archive error types.

use thiserror::Error;

/// Archive operation errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Storage backend could not be configured.
    #[error("archive configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("archive operation failed: {0}")]
    Operation(String),
}

impl From<opendal::Error> for ArchiveError {
    fn from(err: opendal::Error) -> Self {
        Self::Operation(err.to_string())
    }
}
