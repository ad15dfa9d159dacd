//! Error types for the edges of the launch policy.
//!
//! The policy functions themselves never fail; these errors cover loading
//! metadata, configuration, and accelerator descriptors from outside input.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlashgateError>;

#[derive(Debug, Error)]
pub enum FlashgateError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid model metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid accelerator descriptor '{input}': {reason}")]
    Accelerator { input: String, reason: String },
}
