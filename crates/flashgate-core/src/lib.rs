//! Flashgate core
//!
//! Decides whether a model-serving worker may run with flash attention, which
//! KV cache type it may use alongside it, and the launch arguments that
//! follow from both.

pub mod config;
pub mod error;
pub mod hardware;
pub mod model;
pub mod policy;

pub use config::LaunchConfig;
pub use error::{FlashgateError, Result};
pub use hardware::{hardware_supports_flash_attention, AcceleratorInfo, AcceleratorLibrary};
pub use model::{AttentionShape, MetadataKv, MetadataValue, ModelCapabilities, ModelMetadata};
pub use policy::{
    decide_flash_attention, server_params, validate_flash_attention_support,
    validate_kv_cache_type, DecisionObserver, FlashAttentionSupport, KvCacheType, LaunchPlan,
    TracingObserver,
};
