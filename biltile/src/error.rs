//! Error types for the biltile library.

use thiserror::Error;

/// Errors that can occur when loading or configuring elevation tiles.
#[derive(Error, Debug)]
pub enum TileError {
    /// HTTP transport error while fetching a tile.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The tile server answered with a non-success status.
    #[error("tile fetch failed for {key}: HTTP {status}")]
    HttpStatus { key: String, status: u16 },

    /// A fetch failed for a non-HTTP reason (transport, body read).
    #[error("tile fetch failed for {key}: {reason}")]
    FetchFailed { key: String, reason: String },

    /// The requested layer id is not registered.
    #[error("no elevation layer registered with id {0:?}")]
    UnknownLayer(String),

    /// A required configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using [`TileError`].
pub type Result<T> = std::result::Result<T, TileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TileError::HttpStatus {
            key: "dem/7/12/42".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("dem/7/12/42"));

        let err = TileError::UnknownLayer("dem".to_string());
        assert!(err.to_string().contains("dem"));

        let err = TileError::Config("BILTILE_WMS_URL not set".to_string());
        assert!(err.to_string().contains("BILTILE_WMS_URL"));
    }
}
