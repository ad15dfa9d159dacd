//! Worker argument assembly from a flash attention decision.

use tracing::{debug, info, warn};

use super::flash::FlashAttentionSupport;
use super::kv_cache::{is_quantized_request, validate_kv_cache_type, KvCacheType};

pub const FLASH_ATTN_FLAG: &str = "--flash-attn";
pub const KV_CACHE_TYPE_FLAG: &str = "--kv-cache-type";

/// Appends the flash attention and cache-type flags to a copy of `base_params`.
///
/// The output is always `base_params` in order, then `--flash-attn`, then
/// `--kv-cache-type <type>`; the last two only when flash attention is enabled.
pub fn server_params<S: AsRef<str>>(
    support: &FlashAttentionSupport,
    kv_cache_type: &str,
    base_params: &[S],
) -> Vec<String> {
    assemble_params(support, kv_cache_type, base_params).0
}

/// [`server_params`] plus the cache type that was passed with `--kv-cache-type`.
pub fn assemble_params<S: AsRef<str>>(
    support: &FlashAttentionSupport,
    kv_cache_type: &str,
    base_params: &[S],
) -> (Vec<String>, Option<KvCacheType>) {
    let mut params: Vec<String> = base_params
        .iter()
        .map(|param| param.as_ref().to_string())
        .collect();

    if !support.enabled {
        info!("Flash attention not enabled");
        if !support.is_embedding_model && is_quantized_request(kv_cache_type) {
            warn!(
                cache_type = kv_cache_type,
                "Quantized cache types require flash attention. Falling back to default cache types."
            );
        }
        return (params, None);
    }

    params.push(FLASH_ATTN_FLAG.to_string());
    info!("Enabling flash attention");

    // Cache type only applies on the flash attention path.
    let chosen = validate_kv_cache_type(kv_cache_type, support.is_embedding_model);
    if let Some(cache_type) = chosen {
        params.push(KV_CACHE_TYPE_FLAG.to_string());
        params.push(cache_type.to_string());
        debug!(cache_type = %cache_type, "Setting cache type");
    }

    (params, chosen)
}
