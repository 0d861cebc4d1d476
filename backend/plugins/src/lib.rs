//! `snowberry-plugins`: plugin discovery and loading.
//!
//! Plugins are compiled in and registered in a [`PluginCatalog`]; JSON
//! manifests on the plugin search path decide which of them run. Loading
//! is two-phase: every plugin is imported (constructed) before any is
//! initialized, and a failure in one plugin never stops the others.

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod manifest;
pub mod resources;
pub mod sdk;

pub use catalog::PluginCatalog;
pub use discovery::{discover, Bundle, Candidate, PluginDescriptor};
pub use error::PluginError;
pub use lifecycle::{LoadPhase, PluginState};
pub use loader::{LoadFailure, LoadReport, PluginLoader, PluginRecord};
pub use manifest::PluginManifest;
pub use resources::{ResourcePreloader, TracingPreloader};
pub use sdk::{Plugin, PluginContext};
