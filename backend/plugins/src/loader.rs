//! Plugin Loader
//!
//! Phase 1 imports every discovered plugin in sorted order. Phase 2 calls
//! `init` on each imported plugin in the same order. Failures in either
//! phase are recorded and reported; they never abort the load.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use snowberry_core::{IssueLog, Severity};
use snowberry_events::EventBus;
use snowberry_paths::PathResolver;
use tracing::{debug, info};

use crate::catalog::PluginCatalog;
use crate::discovery::{discover, Bundle, Candidate, PluginDescriptor};
use crate::error::{panic_message, PluginError};
use crate::lifecycle::{LoadPhase, PluginState};
use crate::manifest::PluginManifest;
use crate::resources::{ResourcePreloader, TracingPreloader, PRELOADED_KINDS};
use crate::sdk::{Plugin, PluginContext};

/// What happened to one discovered plugin.
#[derive(Debug, Clone)]
pub struct PluginRecord {
    pub import_name: String,
    pub display_name: String,
    pub path: PathBuf,
    pub bundle: Option<String>,
    pub state: PluginState,
}

#[derive(Debug)]
pub struct LoadFailure {
    pub import_name: String,
    pub path: PathBuf,
    pub phase: LoadPhase,
    pub error: PluginError,
}

/// Outcome of [`PluginLoader::load_all`]. Owns the active plugins.
#[derive(Default)]
pub struct LoadReport {
    /// Every discovered plugin, in import order.
    pub records: Vec<PluginRecord>,
    pub failures: Vec<LoadFailure>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadReport")
            .field("records", &self.records)
            .field("failures", &self.failures)
            .field("active_count", &self.plugins.len())
            .finish()
    }
}

impl LoadReport {
    /// Import names of plugins whose init succeeded, in init order.
    pub fn loaded(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.state == PluginState::Active)
            .map(|r| r.import_name.as_str())
            .collect()
    }

    pub fn state_of(&self, import_name: &str) -> Option<PluginState> {
        self.records
            .iter()
            .find(|r| r.import_name == import_name)
            .map(|r| r.state)
    }

    pub fn active_plugins(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A plugin that survived phase 1.
struct Imported {
    record: usize,
    plugin: Box<dyn Plugin>,
    search_paths: Vec<PathBuf>,
}

pub struct PluginLoader {
    catalog: PluginCatalog,
    disabled: HashSet<String>,
    preloader: Box<dyn ResourcePreloader>,
}

impl PluginLoader {
    pub fn new(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            disabled: HashSet::new(),
            preloader: Box::new(TracingPreloader),
        }
    }

    /// Skip these plugins. A bundle name disables all of its modules.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_preloader(mut self, preloader: impl ResourcePreloader + 'static) -> Self {
        self.preloader = Box::new(preloader);
        self
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    pub fn discover(&self, paths: &PathResolver) -> Vec<Candidate> {
        discover(paths)
    }

    /// Discover, import and initialize every plugin.
    pub fn load_all(&self, paths: &mut PathResolver, bus: &EventBus, issues: &IssueLog) -> LoadReport {
        let candidates = discover(paths);
        let mut report = LoadReport::default();

        // Phase 1: import.
        let mut imported = Vec::new();
        for candidate in candidates {
            match candidate {
                Candidate::Single(descriptor) => {
                    self.import(descriptor, &mut report, &mut imported, issues);
                }
                Candidate::Bundle(bundle) => {
                    self.import_bundle(bundle, paths, &mut report, &mut imported, issues);
                }
            }
        }
        info!(imported = imported.len(), discovered = report.records.len(), "Plugins imported");

        // Phase 2: init.
        let paths: &PathResolver = paths;
        for Imported { record, plugin, search_paths } in imported {
            let name = report.records[record].import_name.clone();
            let ctx = PluginContext::new(bus, paths, issues, &name, &search_paths);
            match run_init(plugin.as_ref(), &name, &ctx) {
                Ok(()) => {
                    debug!(plugin = %name, "Plugin initialized");
                    report.records[record].state = PluginState::Active;
                    report.plugins.push(plugin);
                }
                Err(error) => {
                    report.records[record].state = PluginState::Failed;
                    let path = report.records[record].path.clone();
                    record_failure(&mut report, issues, name, path, LoadPhase::Init, error);
                }
            }
        }

        info!(
            active = report.plugins.len(),
            failed = report.failures.len(),
            "Plugin loading finished"
        );
        report
    }

    /// Whether configuration disabled this import name or bundle name.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }

    /// Discovered plugins with the state `load_all` would give them before
    /// running any plugin code: `Disabled`, `Failed` for unreadable
    /// manifests and unregistered import names, otherwise `Discovered`.
    pub fn preview(&self, paths: &PathResolver) -> Vec<PluginRecord> {
        let mut records = Vec::new();
        for candidate in discover(paths) {
            let bundle_disabled =
                matches!(&candidate, Candidate::Bundle(b) if self.is_disabled(&b.name));
            for descriptor in candidate.descriptors() {
                let name = &descriptor.import_name;
                let (display_name, state) = if bundle_disabled || self.is_disabled(name) {
                    (name.clone(), PluginState::Disabled)
                } else {
                    match PluginManifest::load(&descriptor.path) {
                        Ok(manifest) => {
                            let state = if !manifest.enabled {
                                PluginState::Disabled
                            } else if !self.catalog.contains(name) {
                                PluginState::Failed
                            } else {
                                PluginState::Discovered
                            };
                            (manifest.display_name(name).to_string(), state)
                        }
                        Err(_) => (name.clone(), PluginState::Failed),
                    }
                };
                records.push(PluginRecord {
                    import_name: name.clone(),
                    display_name,
                    path: descriptor.path.clone(),
                    bundle: descriptor.bundle.clone(),
                    state,
                });
            }
        }
        records
    }

    fn import_bundle(
        &self,
        bundle: Bundle,
        paths: &mut PathResolver,
        report: &mut LoadReport,
        imported: &mut Vec<Imported>,
        issues: &IssueLog,
    ) {
        if self.is_disabled(&bundle.name) {
            info!(bundle = %bundle.name, "Bundle disabled");
            for module in bundle.modules {
                push_record(report, &module, module.import_name.clone(), PluginState::Disabled);
            }
            return;
        }

        let resource_dirs = bundle.resource_dirs();
        for (kind, dir) in &resource_dirs {
            paths.add_bundle_path(*kind, dir);
        }
        for kind in PRELOADED_KINDS {
            let Some((_, dir)) = resource_dirs.iter().find(|(k, _)| *k == kind) else {
                continue;
            };
            for file in sorted_files(dir) {
                if let Err(e) = self.preloader.preload(kind, &file) {
                    issues.add(
                        Severity::Medium,
                        "plugin-resource-failed",
                        format!("{}: {}: {e:#}", bundle.name, file.display()),
                    );
                }
            }
        }

        for module in bundle.modules {
            self.import(module, report, imported, issues);
        }
    }

    fn import(
        &self,
        descriptor: PluginDescriptor,
        report: &mut LoadReport,
        imported: &mut Vec<Imported>,
        issues: &IssueLog,
    ) {
        let name = descriptor.import_name.clone();
        if self.is_disabled(&name) {
            info!(plugin = %name, "Plugin disabled by configuration");
            push_record(report, &descriptor, name, PluginState::Disabled);
            return;
        }

        let manifest = match PluginManifest::load(&descriptor.path) {
            Ok(manifest) => manifest,
            Err(error) => {
                push_record(report, &descriptor, name.clone(), PluginState::Failed);
                record_failure(report, issues, name, descriptor.path, LoadPhase::Import, error);
                return;
            }
        };
        let display_name = manifest.display_name(&name).to_string();
        if !manifest.enabled {
            info!(plugin = %name, "Plugin disabled by its manifest");
            push_record(report, &descriptor, display_name, PluginState::Disabled);
            return;
        }

        match self.catalog.instantiate(&name) {
            Ok(plugin) => {
                debug!(plugin = %name, "Plugin imported");
                let record = push_record(report, &descriptor, display_name, PluginState::Imported);
                imported.push(Imported {
                    record,
                    plugin,
                    search_paths: descriptor.search_paths,
                });
            }
            Err(error) => {
                push_record(report, &descriptor, display_name, PluginState::Failed);
                record_failure(report, issues, name, descriptor.path, LoadPhase::Import, error);
            }
        }
    }
}

fn push_record(
    report: &mut LoadReport,
    descriptor: &PluginDescriptor,
    display_name: String,
    state: PluginState,
) -> usize {
    report.records.push(PluginRecord {
        import_name: descriptor.import_name.clone(),
        display_name,
        path: descriptor.path.clone(),
        bundle: descriptor.bundle.clone(),
        state,
    });
    report.records.len() - 1
}

fn record_failure(
    report: &mut LoadReport,
    issues: &IssueLog,
    import_name: String,
    path: PathBuf,
    phase: LoadPhase,
    error: PluginError,
) {
    issues.add(
        Severity::High,
        format!("plugin-{phase}-failed"),
        format!("{import_name} ({}): {error:#}", path.display()),
    );
    report.failures.push(LoadFailure { import_name, path, phase, error });
}

/// Run `init`, turning both errors and panics into a [`PluginError`].
fn run_init(plugin: &dyn Plugin, name: &str, ctx: &PluginContext<'_>) -> Result<(), PluginError> {
    match panic::catch_unwind(AssertUnwindSafe(|| plugin.init(ctx))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(PluginError::Init { name: name.to_string(), source }),
        Err(payload) => Err(PluginError::Panicked {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn sorted_files(dir: &std::path::Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
