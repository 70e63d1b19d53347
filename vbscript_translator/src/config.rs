//! Translator configuration
//!
//! Controls the identifiers generated code uses to reach the runtime and the
//! enclosing scopes. Every field has a default, so a TOML file only needs the
//! settings it changes:
//!
//! ```
//! use vbscript_translator::TranslatorConfig;
//!
//! let config = TranslatorConfig::from_toml_str("runtime_crate = \"rt\"").unwrap();
//! assert_eq!(config.runtime_crate, "rt");
//! assert_eq!(config.provider, "_rt");
//! ```

use serde::Deserialize;

use crate::error::{TranslationError, TranslationResult};

/// Identifiers used by generated code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// The `RuntimeProvider` reference
    pub provider: String,
    /// Holder of undeclared and external names
    pub env: String,
    /// Holder of outermost-scope names
    pub outer: String,
    /// Self reference inside class members
    pub self_reference: String,
    /// Field holding an object's own `Value` reference (`_outer.me`, `self.me`)
    pub me_field: String,
    /// Path of the runtime crate
    pub runtime_crate: String,
    /// Prefix of by-ref parameter aliases
    pub alias_prefix: String,
    /// Prefix of argument-list temporaries
    pub args_prefix: String,
    /// Prefix of call-result temporaries
    pub result_prefix: String,
    /// Prefix of WITH target locals
    pub with_prefix: String,
    /// Prefix of error trapping token locals
    pub error_token_prefix: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: "_rt".to_string(),
            env: "_env".to_string(),
            outer: "_outer".to_string(),
            self_reference: "self".to_string(),
            me_field: "me".to_string(),
            runtime_crate: "vbs".to_string(),
            alias_prefix: "byrefalias".to_string(),
            args_prefix: "args".to_string(),
            result_prefix: "result".to_string(),
            with_prefix: "with".to_string(),
            error_token_prefix: "errortoken".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Load from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> TranslationResult<Self> {
        toml::from_str(source).map_err(|e| TranslationError::Config(e.to_string()))
    }

    /// `vbs::Value`-style path into the runtime crate
    pub fn runtime_path(&self, item: &str) -> String {
        format!("{}::{}", self.runtime_crate, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.provider, "_rt");
        assert_eq!(config.env, "_env");
        assert_eq!(config.outer, "_outer");
        assert_eq!(config.runtime_path("Value"), "vbs::Value");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TranslatorConfig::from_toml_str(
            r#"
provider = "rt"
alias_prefix = "alias"
"#,
        )
        .unwrap();
        assert_eq!(config.provider, "rt");
        assert_eq!(config.alias_prefix, "alias");
        assert_eq!(config.outer, "_outer");
    }

    #[test]
    fn test_invalid_toml() {
        let err = TranslatorConfig::from_toml_str("provider = 3").unwrap_err();
        assert!(matches!(err, TranslationError::Config(_)));
    }
}
