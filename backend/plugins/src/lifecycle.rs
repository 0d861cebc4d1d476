//! Plugin states across the two loading phases.

use serde::{Deserialize, Serialize};

/// Where a plugin ended up after [`PluginLoader::load_all`](crate::PluginLoader::load_all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    /// Found on disk, not imported yet.
    Discovered,
    /// Constructed; waiting for init.
    Imported,
    /// Init returned successfully.
    Active,
    /// Import or init failed.
    Failed,
    /// Skipped by configuration or by its manifest.
    Disabled,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PluginState::Discovered => "discovered",
            PluginState::Imported => "imported",
            PluginState::Active => "active",
            PluginState::Failed => "failed",
            PluginState::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Phase in which a plugin failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Import,
    Init,
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadPhase::Import => f.write_str("import"),
            LoadPhase::Init => f.write_str("init"),
        }
    }
}
