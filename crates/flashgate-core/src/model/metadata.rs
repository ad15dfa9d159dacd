//! Model metadata key/value store and the typed accessor the policy reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{FlashgateError, Result};

/// Key holding the architecture name that scopes every other model key.
pub const ARCHITECTURE_KEY: &str = "general.architecture";

/// A single scalar (or array) value from a model header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<MetadataValue>),
}

impl MetadataValue {
    /// Non-negative integer view of the value. Anything else reads as `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MetadataValue::UInt(v) => Some(*v),
            MetadataValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::UInt(u64::from(value))
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        MetadataValue::UInt(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Named capability queries over a model's metadata.
///
/// Implementors return zero for absent head counts and an empty string for a
/// missing architecture.
pub trait ModelMetadata {
    fn architecture(&self) -> &str;
    fn head_count_k(&self) -> u64;
    fn head_count_v(&self) -> u64;
    fn has_pooling_type(&self) -> bool;
}

/// Read-only key/value view of a model header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataKv {
    entries: BTreeMap<String, MetadataValue>,
}

impl MetadataKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| FlashgateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Integer value for `key`, or zero when absent or not an integer.
    pub fn uint(&self, key: &str) -> u64 {
        self.get(key).and_then(MetadataValue::as_u64).unwrap_or(0)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn arch_key(&self, suffix: &str) -> String {
        format!("{}.{}", self.architecture(), suffix)
    }
}

impl ModelMetadata for MetadataKv {
    fn architecture(&self) -> &str {
        self.string(ARCHITECTURE_KEY).unwrap_or("")
    }

    fn head_count_k(&self) -> u64 {
        self.uint(&self.arch_key("attention.key_length"))
    }

    fn head_count_v(&self) -> u64 {
        self.uint(&self.arch_key("attention.value_length"))
    }

    fn has_pooling_type(&self) -> bool {
        self.contains_key(&self.arch_key("pooling_type"))
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataKv
where
    K: Into<String>,
    V: Into<MetadataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llama() -> MetadataKv {
        [
            ("general.architecture", MetadataValue::from("llama")),
            ("llama.attention.key_length", MetadataValue::from(128u32)),
            ("llama.attention.value_length", MetadataValue::from(64u32)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn reads_architecture_scoped_head_counts() {
        let kv = llama();
        assert_eq!(kv.architecture(), "llama");
        assert_eq!(kv.head_count_k(), 128);
        assert_eq!(kv.head_count_v(), 64);
        assert!(!kv.has_pooling_type());
    }

    #[test]
    fn absent_keys_read_as_zero() {
        let kv = MetadataKv::new();
        assert_eq!(kv.architecture(), "");
        assert_eq!(kv.head_count_k(), 0);
        assert_eq!(kv.head_count_v(), 0);
        assert_eq!(kv.uint("nope"), 0);
    }

    #[test]
    fn keys_for_other_architectures_are_ignored() {
        let kv: MetadataKv = [
            ("general.architecture", MetadataValue::from("qwen2")),
            ("llama.attention.key_length", MetadataValue::from(128u32)),
            ("llama.pooling_type", MetadataValue::from("mean")),
        ]
        .into_iter()
        .collect();

        assert_eq!(kv.head_count_k(), 0);
        assert!(!kv.has_pooling_type());
    }

    #[test]
    fn parses_json_header_dump() {
        let kv = MetadataKv::from_json_str(
            r#"{
                "general.architecture": "bert",
                "bert.attention.key_length": 64,
                "bert.attention.value_length": 64,
                "bert.pooling_type": 1,
                "tokenizer.ggml.tokens": ["a", "b"],
                "bert.attention.layer_norm_epsilon": 1e-12
            }"#,
        )
        .unwrap();

        assert_eq!(kv.len(), 6);
        assert_eq!(kv.head_count_k(), 64);
        assert!(kv.has_pooling_type());
        assert!(matches!(
            kv.get("tokenizer.ggml.tokens"),
            Some(MetadataValue::Array(items)) if items.len() == 2
        ));
    }

    #[test]
    fn negative_and_non_integer_values_read_as_zero() {
        let kv = MetadataKv::from_json_str(
            r#"{
                "general.architecture": "llama",
                "llama.attention.key_length": -4,
                "llama.attention.value_length": "64"
            }"#,
        )
        .unwrap();

        assert_eq!(kv.head_count_k(), 0);
        assert_eq!(kv.head_count_v(), 0);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            MetadataKv::from_json_str("[1, 2"),
            Err(FlashgateError::Metadata(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"general.architecture": "gemma"}"#).unwrap();

        let kv = MetadataKv::from_path(&path).unwrap();
        assert_eq!(kv.architecture(), "gemma");

        let missing = MetadataKv::from_path(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(FlashgateError::Read { .. })));
    }
}
