//! Domain error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the modem's boundaries.
///
/// The numeric core never fails; these come from file adapters,
/// configuration loading, and the command layer.
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Cannot read input '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported or malformed audio format: {0}")]
    Format(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Cannot write output '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ModemError {
    /// Process exit code for this error, as reported by the command line tools
    pub fn exit_code(&self) -> i32 {
        match self {
            ModemError::Input { .. } => 1,
            ModemError::Format(_) => 2,
            ModemError::Processing(_) | ModemError::Config(_) => 3,
            ModemError::Output { .. } => 4,
        }
    }
}

/// Result type alias for modem operations
pub type ModemResult<T> = Result<T, ModemError>;
