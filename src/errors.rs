/*!
 * Error types for the langrepeat application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors reported by the external video player
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The media could not be opened
    #[error("Failed to load media: {0}")]
    Open(String),

    /// Playback stopped with an error after the media was opened
    #[error("Playback failed: {0}")]
    Playback(String),
}

impl PlayerError {
    /// Message without the error kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Open(message) | Self::Playback(message) => message,
        }
    }
}

/// Errors that can occur while reading or writing the progress file
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Error reading or writing the file
    #[error("Progress file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content is not a valid progress document
    #[error("Progress file is corrupted: {0}")]
    Json(#[from] serde_json::Error),

    /// The temporary file could not replace the destination
    #[error("Failed to persist progress file: {0}")]
    Persist(String),
}

/// Errors in the application configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of its accepted range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The subtitle track could not be loaded
    #[error("Subtitle error: {0}")]
    Subtitle(String),

    /// Error from the player
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    /// Error from the progress store
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Error from the configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
