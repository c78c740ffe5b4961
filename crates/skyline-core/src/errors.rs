//! Error types shared across crates.

use thiserror::Error;

/// The engine cannot answer yet. Callers defer and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotReady {
    /// No observer fix has been supplied.
    #[error("observer position has not been set")]
    ObserverUnset,
    /// Elevation tiles are still being loaded in the background.
    #[error("elevation tiles are still loading")]
    TilesLoading,
}

/// Failure reading, writing or validating a [`VisibilityConfig`](crate::config::VisibilityConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
