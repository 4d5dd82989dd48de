//! Errors raised while loading render configuration.

use thiserror::Error;

/// Errors that can occur while reading `RenderSettings`.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
