//! KV cache format selection.
//!
//! A requested format that is unknown, or quantized for an embedding model, is
//! dropped in favour of the worker's default rather than failing the launch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KvCacheType {
    F32,
    F16,
    Q8_0,
    Q5_1,
    Q5_0,
    Iq4Nl,
    Q4_1,
    Q4_0,
}

impl KvCacheType {
    pub const ALL: [KvCacheType; 8] = [
        KvCacheType::F32,
        KvCacheType::F16,
        KvCacheType::Q8_0,
        KvCacheType::Q5_1,
        KvCacheType::Q5_0,
        KvCacheType::Iq4Nl,
        KvCacheType::Q4_1,
        KvCacheType::Q4_0,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KvCacheType::F32 => "f32",
            KvCacheType::F16 => "f16",
            KvCacheType::Q8_0 => "q8_0",
            KvCacheType::Q5_1 => "q5_1",
            KvCacheType::Q5_0 => "q5_0",
            KvCacheType::Iq4Nl => "iq4_nl",
            KvCacheType::Q4_1 => "q4_1",
            KvCacheType::Q4_0 => "q4_0",
        }
    }

    pub fn is_quantized(&self) -> bool {
        !matches!(self, KvCacheType::F32 | KvCacheType::F16)
    }

    /// Embedding models only run with full or half precision caches.
    pub fn allowed_for_embedding(&self) -> bool {
        !self.is_quantized()
    }
}

impl fmt::Display for KvCacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown KV cache type '{0}'")]
pub struct UnknownKvCacheType(pub String);

/// Exact, case-sensitive match against the format tokens.
impl FromStr for KvCacheType {
    type Err = UnknownKvCacheType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KvCacheType::ALL
            .into_iter()
            .find(|cache_type| cache_type.as_str() == s)
            .ok_or_else(|| UnknownKvCacheType(s.to_string()))
    }
}

/// Reason a requested cache format is not used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvCacheRejection {
    #[error(transparent)]
    Unknown(#[from] UnknownKvCacheType),
    #[error("only f16 and f32 cache types are supported for embedding models, got {0}")]
    QuantizedForEmbedding(KvCacheType),
}

/// Typed check behind [`validate_kv_cache_type`]. `Ok(None)` means no format
/// was requested.
pub fn check_kv_cache_type(
    requested: &str,
    is_embedding_model: bool,
) -> Result<Option<KvCacheType>, KvCacheRejection> {
    if requested.is_empty() {
        return Ok(None);
    }

    let cache_type: KvCacheType = requested.parse()?;
    if is_embedding_model && !cache_type.allowed_for_embedding() {
        return Err(KvCacheRejection::QuantizedForEmbedding(cache_type));
    }

    Ok(Some(cache_type))
}

/// Returns the cache format to pass to the worker, or `None` to keep its
/// default. Rejected requests are logged, never returned as errors.
pub fn validate_kv_cache_type(requested: &str, is_embedding_model: bool) -> Option<KvCacheType> {
    match check_kv_cache_type(requested, is_embedding_model) {
        Ok(cache_type) => cache_type,
        Err(KvCacheRejection::Unknown(_)) => {
            warn!(cache_type = requested, "invalid cache type, ignoring");
            None
        }
        Err(KvCacheRejection::QuantizedForEmbedding(_)) => {
            warn!(
                cache_type = requested,
                "only f16 and f32 cache types are supported for embedding models, ignoring"
            );
            None
        }
    }
}

/// True when `requested` names one of the quantized formats.
pub fn is_quantized_request(requested: &str) -> bool {
    requested
        .parse::<KvCacheType>()
        .map(|cache_type| cache_type.is_quantized())
        .unwrap_or(false)
}
