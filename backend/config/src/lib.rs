//! `snowberry-config`: launcher configuration.
//!
//! Provides:
//! - Typed config schema (paths, plugins, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with warnings and errors

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{LoggingConfig, PathsConfig, PluginsConfig, SnowberryConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution and defaults, then validate a config file.
///
/// Validation warnings are logged. Validation errors are logged and make
/// the load fail.
pub fn load_and_prepare(path: &Path) -> Result<SnowberryConfig> {
    let raw_config = load_config(path)?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: SnowberryConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let details: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        bail!("Invalid config {}: {}", path.display(), details.join("; "));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prepare_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "plugins:\n  disabled: [about]\n").unwrap();

        let config = load_and_prepare(&path).unwrap();
        assert_eq!(config.disabled_plugins(), ["about".to_string()]);
        assert_eq!(config.log_level(), "info");
        assert!(!config.homeless());
    }

    #[test]
    fn prepare_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  level: shouty\n").unwrap();
        let err = load_and_prepare(&path).unwrap_err();
        assert!(err.to_string().contains("shouty"));
    }
}
