use console::style;
use std::fmt;

use flashgate_core::FlashgateError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    /// Model metadata could not be loaded
    Metadata(FlashgateError),
    /// Configuration error
    ConfigError(FlashgateError),
    /// Serialization error
    Serialization(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Metadata(e) => {
                write!(f, "{} {}", style("Model metadata:").red().bold(), e)
            }
            CliError::ConfigError(e) => {
                write!(f, "Configuration error: {}", e)
            }
            CliError::Serialization(e) => {
                write!(f, "Serialization error: {}", e)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Metadata(e) | CliError::ConfigError(e) => Some(e),
            CliError::Serialization(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e)
    }
}
