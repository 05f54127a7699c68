//! Executor configuration.
//!
//! Configuration can be specified in `scalarql.toml` under the `[executor]`
//! section.
//!
//! # Example Configuration
//!
//! ```toml
//! [executor]
//! max_depth = 15
//! concurrent_fields = true
//! ```

use serde::{Deserialize, Serialize};

/// Query execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum selection depth allowed.
    /// Deeper queries are rejected before execution.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Resolve sibling query fields concurrently.
    /// Mutation root fields always run one after another.
    /// Default: true
    #[serde(default = "default_concurrent_fields")]
    pub concurrent_fields: bool,
}

fn default_max_depth() -> usize {
    15
}

fn default_concurrent_fields() -> bool {
    true
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrent_fields: default_concurrent_fields(),
        }
    }
}

impl ExecutorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("executor.max_depth must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_depth, 15);
        assert!(config.concurrent_fields);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_depth() {
        let config = ExecutorConfig {
            max_depth: 0,
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            max_depth = 4
            concurrent_fields = false
        "#;

        let config: ExecutorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_depth, 4);
        assert!(!config.concurrent_fields);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ExecutorConfig = toml::from_str("max_depth = 3").unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.concurrent_fields);
    }
}
