//! Unified error type hierarchy for Perf Dashboard
//!
//! Provides structured error handling with ConfigError for settings/config files
//! and DashboardError for everything the render pipeline can surface.

use std::io;
use thiserror::Error;

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Errors raised by the dashboard pipeline.
///
/// Malformed *external* state (URL fragments, missing anchors, unknown scheme keys)
/// never ends up here: restoration degrades to defaults instead. What remains are
/// caller defects and collaborator failures.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A chart was requested for a scheme key that does not resolve.
    /// This is a caller defect and is surfaced immediately.
    #[error("Chart construction requested without a resolved slicing scheme (got '{0}')")]
    UnresolvedScheme(String),

    /// The rendering backend failed to draw or update a chart
    #[error("Rendering backend error: {0}")]
    Backend(String),

    /// Benchmark data or test descriptors could not be loaded
    #[error("Data load failed: {0}")]
    DataLoad(String),

    #[error("Invalid JSON data: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DashboardError {
    /// Get a user-facing error message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::UnresolvedScheme(key) => {
                format!("Internal error: unknown view '{}'", key)
            }
            DashboardError::Backend(msg) => format!("Chart could not be drawn: {}", msg),
            DashboardError::DataLoad(msg) => format!("Benchmark data unavailable: {}", msg),
            DashboardError::InvalidJson(e) => format!("Benchmark data is malformed: {}", e),
            DashboardError::Config(e) => format!("Configuration error: {}", e),
            DashboardError::Io(e) => format!("File operation failed: {}", e),
        }
    }
}

/// Top-level result type for dashboard operations that may fail.
pub type Result<T> = std::result::Result<T, DashboardError>;
