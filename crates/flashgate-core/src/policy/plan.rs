//! One-shot launch planning: inspect, decide, and assemble in a single call.

use serde::Serialize;

use super::flash::{DecisionObserver, FlashAttentionSupport};
use super::kv_cache::KvCacheType;
use super::params::assemble_params;
use crate::config::LaunchConfig;
use crate::hardware::AcceleratorInfo;
use crate::model::{ModelCapabilities, ModelMetadata};

/// Everything decided for a single worker launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub model: ModelCapabilities,
    pub flash_attention: FlashAttentionSupport,
    /// Cache type actually passed to the worker, if any.
    pub kv_cache_type: Option<KvCacheType>,
    pub params: Vec<String>,
}

impl LaunchPlan {
    pub fn build<M, O>(
        model: &M,
        accelerators: &[AcceleratorInfo],
        config: &LaunchConfig,
        observer: &O,
    ) -> Self
    where
        M: ModelMetadata + ?Sized,
        O: DecisionObserver + ?Sized,
    {
        let capabilities = ModelCapabilities::inspect(model);
        observer.model_inspected(&capabilities);

        let support =
            FlashAttentionSupport::evaluate(&capabilities, accelerators, config.flash_attention);
        observer.decision_made(&support);

        let (params, kv_cache_type) =
            assemble_params(&support, &config.kv_cache_type, &config.base_params);

        Self {
            model: capabilities,
            flash_attention: support,
            kv_cache_type,
            params,
        }
    }
}
