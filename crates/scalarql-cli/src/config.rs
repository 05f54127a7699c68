//! Application configuration.
//!
//! Loaded from `scalarql.toml` (or the path given with `--config`) with
//! environment overrides such as `SCALARQL__EXECUTOR__MAX_DEPTH=10`.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [executor]
//! max_depth = 15
//! concurrent_fields = true
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use scalarql_graphql::ExecutorConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "scalarql.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.logging.level.trim().is_empty() {
            return Err("logging.level must not be empty".into());
        }
        self.executor.validate()
    }
}

/// Loads the configuration file (if present) and environment overrides.
///
/// An explicitly given path that does not exist is an error; the default
/// path is optional.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("config file {} not found", p.display()));
            }
            builder = builder.add_source(File::from(p.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    // Environment variable overrides, e.g., SCALARQL__LOGGING__LEVEL=debug
    builder = builder.add_source(
        Environment::with_prefix("SCALARQL")
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| format!("config build error: {e}"))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| format!("config deserialize error: {e}"))?;
    merged.validate()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.executor.max_depth, 15);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [logging]
            level = "debug"

            [executor]
            max_depth = 4
            concurrent_fields = false
            "#,
        );
        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.executor.max_depth, 4);
        assert!(!cfg.executor.concurrent_fields);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config("[executor]\nmax_depth = 7\n");
        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.executor.max_depth, 7);
        assert!(cfg.executor.concurrent_fields);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[executor]\nmax_depth = 0\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.contains("max_depth"), "{err}");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/nonexistent/scalarql.toml"))).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let cfg = AppConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.executor, cfg.executor);
    }
}
