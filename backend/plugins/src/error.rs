use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

/// Why a plugin could not be imported or initialized.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no plugin named '{0}' is registered")]
    Unknown(String),

    #[error("invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("failed to construct plugin '{name}': {source}")]
    Factory {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("plugin '{name}' panicked while being constructed: {message}")]
    FactoryPanicked { name: String, message: String },

    #[error("init of plugin '{name}' failed: {source}")]
    Init {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("plugin '{name}' panicked during init: {message}")]
    Panicked { name: String, message: String },
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
