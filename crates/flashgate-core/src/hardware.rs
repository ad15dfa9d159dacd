//! Accelerator descriptors and the flash attention hardware gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FlashgateError;

/// Minimum CUDA major version with flash attention kernels.
pub const CUDA_MIN_FLASH_ATTENTION_MAJOR: i32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AcceleratorLibrary {
    Cuda,
    Metal,
    Rocm,
    Cpu,
    Other(String),
}

impl AcceleratorLibrary {
    pub fn as_str(&self) -> &str {
        match self {
            AcceleratorLibrary::Cuda => "cuda",
            AcceleratorLibrary::Metal => "metal",
            AcceleratorLibrary::Rocm => "rocm",
            AcceleratorLibrary::Cpu => "cpu",
            AcceleratorLibrary::Other(name) => name.as_str(),
        }
    }
}

/// Library identifiers are matched exactly; anything else is kept verbatim.
impl From<&str> for AcceleratorLibrary {
    fn from(value: &str) -> Self {
        match value {
            "cuda" => AcceleratorLibrary::Cuda,
            "metal" => AcceleratorLibrary::Metal,
            "rocm" => AcceleratorLibrary::Rocm,
            "cpu" => AcceleratorLibrary::Cpu,
            other => AcceleratorLibrary::Other(other.to_string()),
        }
    }
}

impl From<String> for AcceleratorLibrary {
    fn from(value: String) -> Self {
        AcceleratorLibrary::from(value.as_str())
    }
}

impl From<AcceleratorLibrary> for String {
    fn from(value: AcceleratorLibrary) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AcceleratorLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected device, as reported by the enumeration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceleratorInfo {
    pub library: AcceleratorLibrary,
    #[serde(default)]
    pub driver_major: i32,
}

impl AcceleratorInfo {
    pub fn new(library: impl Into<AcceleratorLibrary>, driver_major: i32) -> Self {
        Self {
            library: library.into(),
            driver_major,
        }
    }

    pub fn supports_flash_attention(&self) -> bool {
        match self.library {
            AcceleratorLibrary::Metal | AcceleratorLibrary::Rocm => true,
            AcceleratorLibrary::Cuda => self.driver_major >= CUDA_MIN_FLASH_ATTENTION_MAJOR,
            AcceleratorLibrary::Cpu | AcceleratorLibrary::Other(_) => false,
        }
    }
}

/// Parses `<library>[:<major>]`, e.g. `cuda:8` or `metal`.
impl FromStr for AcceleratorInfo {
    type Err = FlashgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FlashgateError::Accelerator {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (library, major) = match s.split_once(':') {
            Some((library, major)) => {
                let major = major
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| invalid("driver major version must be an integer"))?;
                (library, major)
            }
            None => (s, 0),
        };

        if library.is_empty() {
            return Err(invalid("library name is empty"));
        }

        Ok(AcceleratorInfo::new(library, major))
    }
}

impl fmt::Display for AcceleratorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.driver_major)
    }
}

/// True when every accelerator can run flash attention. An empty set passes.
pub fn hardware_supports_flash_attention(accelerators: &[AcceleratorInfo]) -> bool {
    accelerators
        .iter()
        .all(AcceleratorInfo::supports_flash_attention)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuda_requires_major_seven() {
        assert!(!AcceleratorInfo::new("cuda", 6).supports_flash_attention());
        assert!(AcceleratorInfo::new("cuda", 7).supports_flash_attention());
        assert!(AcceleratorInfo::new("cuda", 8).supports_flash_attention());
    }

    #[test]
    fn metal_and_rocm_qualify_at_any_version() {
        assert!(AcceleratorInfo::new("metal", 0).supports_flash_attention());
        assert!(AcceleratorInfo::new("rocm", 0).supports_flash_attention());
        assert!(AcceleratorInfo::new("rocm", -1).supports_flash_attention());
    }

    #[test]
    fn cpu_and_unknown_libraries_do_not_qualify() {
        assert!(!AcceleratorInfo::new("cpu", 0).supports_flash_attention());
        assert!(!AcceleratorInfo::new("oneapi", 12).supports_flash_attention());
    }

    #[test]
    fn library_names_must_match_exactly() {
        for library in ["mps", "CUDA", "Metal", " metal ", "ROCm"] {
            let info = AcceleratorInfo::new(library, 8);
            assert_eq!(info.library, AcceleratorLibrary::Other(library.to_string()));
            assert!(!info.supports_flash_attention(), "{library:?} should not qualify");
        }
        assert!(!hardware_supports_flash_attention(&[AcceleratorInfo::new("mps", 0)]));
        assert!(!hardware_supports_flash_attention(&[AcceleratorInfo::new("CUDA", 8)]));
    }

    #[test]
    fn empty_set_is_supported() {
        assert!(hardware_supports_flash_attention(&[]));
    }

    #[test]
    fn one_unqualified_device_fails_the_set() {
        let gpus = [
            AcceleratorInfo::new("cuda", 8),
            AcceleratorInfo::new("metal", 0),
            AcceleratorInfo::new("cuda", 6),
        ];
        assert!(!hardware_supports_flash_attention(&gpus));
        assert!(hardware_supports_flash_attention(&gpus[..2]));
    }

    #[test]
    fn parses_library_and_major() {
        let info: AcceleratorInfo = "cuda:8".parse().unwrap();
        assert_eq!(info, AcceleratorInfo::new(AcceleratorLibrary::Cuda, 8));

        let info: AcceleratorInfo = "metal".parse().unwrap();
        assert_eq!(info.library, AcceleratorLibrary::Metal);
        assert_eq!(info.driver_major, 0);
        assert_eq!(info.to_string(), "metal:0");
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert!("cuda:eight".parse::<AcceleratorInfo>().is_err());
        assert!(":8".parse::<AcceleratorInfo>().is_err());
        assert!("".parse::<AcceleratorInfo>().is_err());
    }

    #[test]
    fn deserializes_enumeration_output() {
        let gpus: Vec<AcceleratorInfo> = serde_json::from_str(
            r#"[{"library": "cuda", "driver_major": 12}, {"library": "vulkan"}]"#,
        )
        .unwrap();

        assert_eq!(gpus[0].library, AcceleratorLibrary::Cuda);
        assert_eq!(gpus[1].library, AcceleratorLibrary::Other("vulkan".into()));
        assert_eq!(gpus[1].driver_major, 0);
    }

    #[test]
    fn unknown_library_names_round_trip_unchanged() {
        let gpus: Vec<AcceleratorInfo> = serde_json::from_str(
            r#"[{"library": "Vulkan", "driver_major": 1}, {"library": " Metal "}]"#,
        )
        .unwrap();

        assert_eq!(gpus[0].library, AcceleratorLibrary::Other("Vulkan".into()));
        assert_eq!(gpus[1].library, AcceleratorLibrary::Other(" Metal ".into()));
        assert!(!hardware_supports_flash_attention(&gpus[1..]));

        let json = serde_json::to_value(&gpus).unwrap();
        assert_eq!(json[0]["library"], "Vulkan");
        assert_eq!(json[1]["library"], " Metal ");
    }
}
