//! Launch configuration: file, then environment, then explicit overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FlashgateError, Result};

pub const FLASH_ATTENTION_ENV: &str = "FLASHGATE_FLASH_ATTENTION";
pub const KV_CACHE_TYPE_ENV: &str = "FLASHGATE_KV_CACHE_TYPE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Ask for flash attention when the model and hardware allow it.
    #[serde(default)]
    pub flash_attention: bool,

    /// Requested KV cache type; empty keeps the worker default.
    #[serde(default)]
    pub kv_cache_type: String,

    /// Arguments every worker launch starts with.
    #[serde(default)]
    pub base_params: Vec<String>,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("flashgate").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl LaunchConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|source| FlashgateError::Read {
                path: config_path.clone(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Applies `FLASHGATE_*` variables on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(FLASH_ATTENTION_ENV) {
            self.flash_attention = parse_bool_flag(&raw);
        }
        if let Some(raw) = lookup(KV_CACHE_TYPE_ENV) {
            self.kv_cache_type = raw.trim().to_string();
        }
        self
    }
}
