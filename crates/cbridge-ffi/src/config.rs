//! Bridge configuration.
//!
//! Project-level settings controlling how native libraries are modelled.

use serde::{Deserialize, Serialize};

use cbridge_core::Ownership;

use crate::error::Result;

/// Project-level settings for the native type bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BridgeConfig {
    /// Whether a library name may be parsed from the library object's
    /// textual representation when the binding gives no typed name.
    pub allow_repr_fallback: bool,
    /// Functions whose returned pointers transfer ownership to the caller.
    pub owning_results: Vec<String>,
    /// Target pointer width in bits, used for `size_t`.
    pub pointer_width: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            allow_repr_fallback: true,
            owning_results: Vec::new(),
            pointer_width: 64,
        }
    }
}

impl BridgeConfig {
    /// Parse configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Parse configuration from a file path.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Ownership of the pointer returned by `function`.
    pub fn result_ownership(&self, function: &str) -> Ownership {
        if self.owning_results.iter().any(|name| name == function) {
            Ownership::Owning
        } else {
            Ownership::Borrowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();
        assert!(config.allow_repr_fallback);
        assert!(config.owning_results.is_empty());
        assert_eq!(config.pointer_width, 64);
        assert_eq!(BridgeConfig::parse("").unwrap(), config);
    }

    #[test]
    fn parse_all_fields() {
        let config = BridgeConfig::parse(
            r#"
allow-repr-fallback = false
owning-results = ["list_new"]
pointer-width = 32
"#,
        )
        .unwrap();
        assert!(!config.allow_repr_fallback);
        assert_eq!(config.pointer_width, 32);
        assert_eq!(config.result_ownership("list_new"), Ownership::Owning);
        assert_eq!(config.result_ownership("find_by_val"), Ownership::Borrowed);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(BridgeConfig::parse("pointer-width = \"wide\"").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "owning-results = [\"list_new\"]\n").unwrap();
        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.owning_results, vec!["list_new"]);
        assert!(config.allow_repr_fallback);
    }
}
