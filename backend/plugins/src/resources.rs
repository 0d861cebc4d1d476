//! Bundle resource pre-loading.
//!
//! Before a bundle's modules are imported, its config and language files
//! are handed to a [`ResourcePreloader`]. Parsing those files belongs to
//! the front-end; this crate only decides which files and when.

use std::path::Path;

use snowberry_paths::PathKind;
use tracing::debug;

/// Kinds whose bundle files are pre-loaded, in this order.
pub const PRELOADED_KINDS: [PathKind; 2] = [PathKind::Config, PathKind::Language];

pub trait ResourcePreloader: Send + Sync {
    fn preload(&self, kind: PathKind, file: &Path) -> anyhow::Result<()>;
}

/// Default preloader: records the file in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPreloader;

impl ResourcePreloader for TracingPreloader {
    fn preload(&self, kind: PathKind, file: &Path) -> anyhow::Result<()> {
        debug!(%kind, file = %file.display(), "Pre-loading bundle resource");
        Ok(())
    }
}
