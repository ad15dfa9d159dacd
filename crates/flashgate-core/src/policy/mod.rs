//! Launch policy: flash attention eligibility, KV cache type selection, and
//! worker argument assembly.

mod flash;
mod kv_cache;
mod params;
mod plan;

pub use flash::{
    decide_flash_attention, validate_flash_attention_support, DecisionObserver,
    FlashAttentionSupport, NoopObserver, TracingObserver,
};
pub use kv_cache::{
    check_kv_cache_type, is_quantized_request, validate_kv_cache_type, KvCacheRejection,
    KvCacheType, UnknownKvCacheType,
};
pub use params::{assemble_params, server_params, FLASH_ATTN_FLAG, KV_CACHE_TYPE_FLAG};
pub use plan::LaunchPlan;
