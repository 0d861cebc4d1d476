//! Plugin SDK
//!
//! The interface a plugin implements and the context it receives at init.

use std::path::PathBuf;

use snowberry_core::IssueLog;
use snowberry_events::EventBus;
use snowberry_paths::PathResolver;

/// A launcher plugin.
///
/// Construction (the import phase) must not depend on other plugins.
/// `init` runs only after every plugin has been constructed, so it may
/// send events, but it must not assume any other plugin has initialized.
pub trait Plugin: Send + Sync {
    /// Import name this plugin was registered under.
    fn name(&self) -> &str;

    /// Register listeners and perform setup. Plugins without setup keep the
    /// default no-op.
    fn init(&self, _ctx: &PluginContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Application services handed to [`Plugin::init`].
pub struct PluginContext<'a> {
    pub bus: &'a EventBus,
    pub paths: &'a PathResolver,
    pub issues: &'a IssueLog,
    pub(crate) import_name: &'a str,
    pub(crate) search_paths: &'a [PathBuf],
}

impl<'a> PluginContext<'a> {
    pub fn new(
        bus: &'a EventBus,
        paths: &'a PathResolver,
        issues: &'a IssueLog,
        import_name: &'a str,
        search_paths: &'a [PathBuf],
    ) -> Self {
        Self { bus, paths, issues, import_name, search_paths }
    }

    pub fn import_name(&self) -> &str {
        self.import_name
    }

    /// Plugin directories as they were when this plugin was discovered.
    pub fn search_paths(&self) -> &[PathBuf] {
        self.search_paths
    }

    /// Path of the first file called `file_name` in the plugin search
    /// paths, most specific directory first.
    pub fn find_file(&self, file_name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowberry_paths::PathSettings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_file_prefers_earlier_search_path() {
        let root = TempDir::new().unwrap();
        let contents = root.path().join("tab1.plugin").join("Contents");
        let plugins = root.path().join("plugins");
        fs::create_dir_all(&contents).unwrap();
        fs::create_dir_all(&plugins).unwrap();
        fs::write(contents.join("tab1.conf"), "").unwrap();
        fs::write(plugins.join("tab1.conf"), "").unwrap();
        fs::write(plugins.join("shared.conf"), "").unwrap();

        let paths = PathResolver::new(PathSettings {
            home: Some(root.path().join("home")),
            install_dir: Some(root.path().join("install")),
            homeless: false,
        });
        let bus = EventBus::new();
        let issues = IssueLog::new();
        let search = vec![contents.clone(), plugins.clone()];
        let ctx = PluginContext::new(&bus, &paths, &issues, "tab1.main", &search);

        assert_eq!(ctx.find_file("tab1.conf"), Some(contents.join("tab1.conf")));
        assert_eq!(ctx.find_file("shared.conf"), Some(plugins.join("shared.conf")));
        assert_eq!(ctx.find_file("missing.conf"), None);
    }
}
