//! Unified Error Type System
//!
//! Centralized error type for the extraction pipeline.
//!
//! ## Design Principles
//!
//! - Single error type (`SurfaceError`) for the whole crate
//! - Per-file read/parse failures are NOT errors: detectors log and skip them
//! - The only fatal condition inside the core is an unreadable repository root

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SurfaceError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// The repository root could not be listed at all
    #[error("Repository root is unreadable: {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid token budget: {0}")]
    InvalidBudget(String),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;

impl SurfaceError {
    /// Create a root-unreadable error
    pub fn root_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised before any file was scanned
    pub fn is_fatal_scan_error(&self) -> bool {
        matches!(self, Self::RootUnreadable { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unreadable_display() {
        let err = SurfaceError::root_unreadable(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "Repository root is unreadable: /nope: missing");
        assert!(err.is_fatal_scan_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SurfaceError = io.into();
        assert!(matches!(err, SurfaceError::Io(_)));
        assert!(!err.is_fatal_scan_error());
    }

    #[test]
    fn test_config_display() {
        let err = SurfaceError::Config("chars_per_token must be > 0".to_string());
        assert_eq!(err.to_string(), "Config error: chars_per_token must be > 0");
    }
}
