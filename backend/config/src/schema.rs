//! Snowberry launcher configuration schema.
//!
//! Typed for serde YAML deserialization. Every section is optional so a
//! missing or partial `config.yaml` still loads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowberryConfig {
    /// Where user and system resources live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsConfig>,

    /// Plugin selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginsConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
    /// Override for the user home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    /// Keep user data next to the installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homeless: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsConfig {
    /// Import names (or bundle names) that must not be loaded.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Additional plugin directories, searched after the user directory.
    #[serde(default)]
    pub extra_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>, // "trace" | "debug" | "info" | "warn" | "error"
    /// Directory for rolling log files. Defaults to `<config dir>/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Write the log file as JSON lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl SnowberryConfig {
    pub fn homeless(&self) -> bool {
        self.paths.as_ref().and_then(|p| p.homeless).unwrap_or(false)
    }

    pub fn disabled_plugins(&self) -> &[String] {
        self.plugins.as_ref().map(|p| p.disabled.as_slice()).unwrap_or(&[])
    }

    pub fn extra_plugin_dirs(&self) -> &[PathBuf] {
        self.plugins.as_ref().map(|p| p.extra_dirs.as_slice()).unwrap_or(&[])
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }
}
