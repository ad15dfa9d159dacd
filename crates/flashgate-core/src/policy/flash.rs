//! Flash attention eligibility.
//!
//! `FlashAttentionSupport::evaluate` is a pure function of the model
//! capabilities, the accelerator set, and the caller's request. Logging lives
//! in [`DecisionObserver`] implementations so the decision can be tested and
//! reused without side effects.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hardware::{hardware_supports_flash_attention, AcceleratorInfo};
use crate::model::{AttentionShape, ModelCapabilities, ModelMetadata};

/// Why flash attention was or was not enabled for a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlashAttentionSupport {
    pub supported_by_model: bool,
    pub supported_by_hardware: bool,
    pub is_embedding_model: bool,
    pub enabled: bool,
}

impl FlashAttentionSupport {
    pub fn evaluate(
        model: &ModelCapabilities,
        accelerators: &[AcceleratorInfo],
        requested: bool,
    ) -> Self {
        let supported_by_model = model.supports_flash_attention();
        let supported_by_hardware = hardware_supports_flash_attention(accelerators);
        let is_embedding_model = model.is_embedding_model;

        Self {
            supported_by_model,
            supported_by_hardware,
            is_embedding_model,
            enabled: requested
                && supported_by_model
                && supported_by_hardware
                && !is_embedding_model,
        }
    }
}

/// Receives the inputs and outcome of a flash attention decision.
pub trait DecisionObserver {
    fn model_inspected(&self, _model: &ModelCapabilities) {}

    fn decision_made(&self, _support: &FlashAttentionSupport) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {}

/// Observer that reports decisions through `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn model_inspected(&self, model: &ModelCapabilities) {
        match model.attention {
            AttentionShape::Compatible { .. } => {}
            AttentionShape::MissingHeadCount { k, v } => {
                debug!(
                    architecture = %model.architecture,
                    k,
                    v,
                    "Model is missing embedding head count for K or V, does not support flash attention"
                );
            }
            AttentionShape::HeadCountMismatch { k, v } => {
                debug!(
                    architecture = %model.architecture,
                    k,
                    v,
                    "Embedding head count K does not equal V, does not support flash attention"
                );
            }
        }
    }

    fn decision_made(&self, support: &FlashAttentionSupport) {
        debug!(
            supported_by_model = support.supported_by_model,
            supported_by_hardware = support.supported_by_hardware,
            is_embedding_model = support.is_embedding_model,
            enabled = support.enabled,
            "Flash attention status"
        );
    }
}

/// Inspects the model, decides, and reports both steps to `observer`.
pub fn decide_flash_attention<M, O>(
    model: &M,
    accelerators: &[AcceleratorInfo],
    requested: bool,
    observer: &O,
) -> FlashAttentionSupport
where
    M: ModelMetadata + ?Sized,
    O: DecisionObserver + ?Sized,
{
    let capabilities = ModelCapabilities::inspect(model);
    observer.model_inspected(&capabilities);

    let support = FlashAttentionSupport::evaluate(&capabilities, accelerators, requested);
    observer.decision_made(&support);
    support
}

/// [`decide_flash_attention`] with the default tracing observer.
pub fn validate_flash_attention_support<M: ModelMetadata + ?Sized>(
    model: &M,
    accelerators: &[AcceleratorInfo],
    requested: bool,
) -> FlashAttentionSupport {
    decide_flash_attention(model, accelerators, requested, &TracingObserver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetadataKv, MetadataValue};
    use std::cell::RefCell;

    fn model(arch: &str, k: u32, v: u32, pooling: bool) -> MetadataKv {
        let mut entries = vec![
            ("general.architecture".to_string(), MetadataValue::from(arch)),
            (format!("{arch}.attention.key_length"), MetadataValue::from(k)),
            (format!("{arch}.attention.value_length"), MetadataValue::from(v)),
        ];
        if pooling {
            entries.push((format!("{arch}.pooling_type"), MetadataValue::from("mean")));
        }
        entries.into_iter().collect()
    }

    fn cuda(major: i32) -> Vec<AcceleratorInfo> {
        vec![AcceleratorInfo::new("cuda", major)]
    }

    #[test]
    fn supported_model_and_hardware() {
        let support = validate_flash_attention_support(
            &model("llama", 32, 32, false),
            &cuda(8),
            true,
        );
        assert_eq!(
            support,
            FlashAttentionSupport {
                supported_by_model: true,
                supported_by_hardware: true,
                is_embedding_model: false,
                enabled: true,
            }
        );
    }

    #[test]
    fn embedding_model_is_never_enabled() {
        let support = validate_flash_attention_support(
            &model("bert", 32, 32, true),
            &cuda(8),
            true,
        );
        assert!(support.is_embedding_model);
        assert!(support.supported_by_model);
        assert!(support.supported_by_hardware);
        assert!(!support.enabled);
    }

    #[test]
    fn unsupported_hardware() {
        let support = validate_flash_attention_support(
            &model("llama", 32, 32, false),
            &cuda(6),
            true,
        );
        assert!(!support.supported_by_hardware);
        assert!(!support.enabled);
    }

    #[test]
    fn not_requested_still_reports_every_fact() {
        let support = validate_flash_attention_support(
            &model("llama", 32, 32, false),
            &cuda(8),
            false,
        );
        assert!(support.supported_by_model);
        assert!(support.supported_by_hardware);
        assert!(!support.is_embedding_model);
        assert!(!support.enabled);
    }

    #[test]
    fn enabled_is_the_conjunction_of_all_facts() {
        for requested in [false, true] {
            for (k, v) in [(32, 32), (0, 32), (64, 32)] {
                for pooling in [false, true] {
                    for major in [6, 7] {
                        let support = validate_flash_attention_support(
                            &model("llama", k, v, pooling),
                            &cuda(major),
                            requested,
                        );
                        let expected = requested
                            && support.supported_by_model
                            && support.supported_by_hardware
                            && !support.is_embedding_model;
                        assert_eq!(support.enabled, expected);
                        if pooling {
                            assert!(!support.enabled);
                        }
                    }
                }
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        shapes: RefCell<Vec<AttentionShape>>,
        decisions: RefCell<Vec<FlashAttentionSupport>>,
    }

    impl DecisionObserver for Recorder {
        fn model_inspected(&self, model: &ModelCapabilities) {
            self.shapes.borrow_mut().push(model.attention);
        }

        fn decision_made(&self, support: &FlashAttentionSupport) {
            self.decisions.borrow_mut().push(*support);
        }
    }

    #[test]
    fn observer_sees_mismatch_and_final_decision() {
        let recorder = Recorder::default();
        let support = decide_flash_attention(
            &model("deepseek2", 192, 128, false),
            &cuda(9),
            true,
            &recorder,
        );

        assert_eq!(
            recorder.shapes.borrow().as_slice(),
            &[AttentionShape::HeadCountMismatch { k: 192, v: 128 }]
        );
        assert_eq!(recorder.decisions.borrow().as_slice(), &[support]);
        assert!(!support.supported_by_model);
    }

    #[test]
    fn observer_does_not_change_the_outcome() {
        let kv = model("llama", 0, 32, false);
        let observed = decide_flash_attention(&kv, &cuda(8), true, &Recorder::default());
        let silent = decide_flash_attention(&kv, &cuda(8), true, &NoopObserver);
        assert_eq!(observed, silent);
    }
}
