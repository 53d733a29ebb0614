//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Store could not be opened
    #[error("Failed to open store: {0}")]
    Store(#[from] contracts::StoreError),

    /// Listener could not be bound
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    /// Input file could not be used
    #[error("Invalid input {path}: {message}")]
    Input { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn bind(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bind {
            addr: addr.into(),
            message: message.into(),
        }
    }

    pub fn input(path: &Path, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}
