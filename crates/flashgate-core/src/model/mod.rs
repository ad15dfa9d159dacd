//! Model metadata access and capability inspection.

mod capabilities;
mod metadata;

pub use capabilities::{AttentionShape, ModelCapabilities};
pub use metadata::{MetadataKv, MetadataValue, ModelMetadata, ARCHITECTURE_KEY};
