//! Attention-shape and embedding classification derived from model metadata.

use serde::Serialize;

use super::metadata::ModelMetadata;

/// How the model's K/V head counts line up for fused attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttentionShape {
    /// K and V head counts are non-zero and equal.
    Compatible { head_count: u64 },
    /// One or both head counts are absent (zero).
    MissingHeadCount { k: u64, v: u64 },
    /// Both head counts are present but differ.
    HeadCountMismatch { k: u64, v: u64 },
}

impl AttentionShape {
    pub fn classify(k: u64, v: u64) -> Self {
        if k == 0 || v == 0 {
            AttentionShape::MissingHeadCount { k, v }
        } else if k != v {
            AttentionShape::HeadCountMismatch { k, v }
        } else {
            AttentionShape::Compatible { head_count: k }
        }
    }

    pub fn is_compatible(&self) -> bool {
        matches!(self, AttentionShape::Compatible { .. })
    }
}

/// Everything the launch policy needs to know about a model, computed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCapabilities {
    pub architecture: String,
    pub attention: AttentionShape,
    pub is_embedding_model: bool,
}

impl ModelCapabilities {
    pub fn inspect<M: ModelMetadata + ?Sized>(model: &M) -> Self {
        Self {
            architecture: model.architecture().to_string(),
            attention: AttentionShape::classify(model.head_count_k(), model.head_count_v()),
            is_embedding_model: model.has_pooling_type(),
        }
    }

    pub fn supports_flash_attention(&self) -> bool {
        self.attention.is_compatible()
    }
}
