//! Plugin manifest: the JSON file that makes a plugin discoverable.
//!
//! Single-file plugins are `<name>.json` in a plugin directory; bundle
//! modules are `<bundle>.plugin/Contents/<bundle>/<module>.json`. Every
//! field is optional, so `{}` is a valid manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Display name. Defaults to the import name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// A disabled plugin is discovered but never imported.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            description: None,
            author: None,
            enabled: true,
        }
    }
}

impl PluginManifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let invalid = |message: String| PluginError::Manifest {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let manifest: PluginManifest = if raw.trim().is_empty() {
            PluginManifest::default()
        } else {
            serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?
        };
        manifest.validate().map_err(invalid)?;
        Ok(manifest)
    }

    /// Validate the manifest for malformed fields.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("'name' must not be blank".to_string());
            }
        }
        if let Some(version) = &self.version {
            if version.trim().is_empty() {
                return Err("'version' must not be blank".to_string());
            }
        }
        Ok(())
    }

    pub fn display_name<'a>(&'a self, import_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(import_name)
    }
}
