//! Error types for measurement operations.

use crate::scene::SceneError;
use thiserror::Error;

/// Errors surfaced by the ruler modes and their configuration.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("Invalid grid configuration: {0}")]
    InvalidGrid(String),
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
