//! Plugin discovery.
//!
//! Walks the plugin search paths and turns every plugin entry into a
//! [`Candidate`]:
//!
//! ```text
//! plugins/
//!   about.json                      single-file plugin "about"
//!   tab1.plugin/                    bundle "tab1"
//!     Contents/
//!       tab1/
//!         profiles.json             module "tab1.profiles"
//!         settings.json             module "tab1.settings"
//!       Resources/
//!         conf/  lang/  graphics/   registered as bundle paths
//! ```

use std::path::{Path, PathBuf};

use snowberry_paths::{PathKind, PathResolver};
use tracing::{debug, warn};

pub const MANIFEST_EXTENSION: &str = "json";
pub const BUNDLE_EXTENSION: &str = "plugin";

const CONTENTS_DIR: &str = "Contents";
const RESOURCES_DIR: &str = "Resources";

/// One importable plugin module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Manifest file.
    pub path: PathBuf,
    /// Name the plugin is looked up by in the catalog.
    pub import_name: String,
    /// Plugin directories at discovery time, most specific first.
    pub search_paths: Vec<PathBuf>,
    /// Owning bundle name, for bundle modules.
    pub bundle: Option<String>,
}

/// A directory-packaged plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub name: String,
    pub root: PathBuf,
    /// Module descriptors, sorted by module name.
    pub modules: Vec<PluginDescriptor>,
}

impl Bundle {
    pub fn contents_dir(&self) -> PathBuf {
        self.root.join(CONTENTS_DIR)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.contents_dir().join(RESOURCES_DIR)
    }

    /// Resource subdirectories that correspond to a known path kind.
    pub fn resource_dirs(&self) -> Vec<(PathKind, PathBuf)> {
        let resources = self.resources_dir();
        PathKind::ALL
            .into_iter()
            .map(|kind| (kind, resources.join(kind.dir_name())))
            .filter(|(_, dir)| dir.is_dir())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Single(PluginDescriptor),
    Bundle(Bundle),
}

impl Candidate {
    /// Base name used for ordering: file stem of the manifest or bundle.
    pub fn base_name(&self) -> &str {
        match self {
            Candidate::Single(d) => &d.import_name,
            Candidate::Bundle(b) => &b.name,
        }
    }

    /// Descriptors in import order.
    pub fn descriptors(&self) -> Vec<&PluginDescriptor> {
        match self {
            Candidate::Single(d) => vec![d],
            Candidate::Bundle(b) => b.modules.iter().collect(),
        }
    }
}

/// List plugin candidates on the plugin search paths, sorted alphabetically
/// by base name. A user plugin shadows a system plugin with the same file
/// name.
pub fn discover(paths: &PathResolver) -> Vec<Candidate> {
    let search_paths = paths.search_paths(PathKind::Plugins);
    let mut candidates: Vec<Candidate> = paths
        .list_entries(PathKind::Plugins)
        .into_iter()
        .filter_map(|entry| classify(&entry, &search_paths))
        .collect();
    candidates.sort_by(|a, b| {
        a.base_name()
            .cmp(b.base_name())
            .then_with(|| is_bundle(a).cmp(&is_bundle(b)))
    });
    debug!(count = candidates.len(), "Discovered plugin candidates");
    candidates
}

fn is_bundle(c: &Candidate) -> bool {
    matches!(c, Candidate::Bundle(_))
}

fn stem_with_extension<'a>(path: &'a Path, extension: &str) -> Option<&'a str> {
    if path.extension()?.to_str()? != extension {
        return None;
    }
    path.file_stem()?.to_str().filter(|s| !s.is_empty())
}

fn classify(entry: &Path, search_paths: &[PathBuf]) -> Option<Candidate> {
    if entry.is_dir() {
        let name = stem_with_extension(entry, BUNDLE_EXTENSION)?;
        return Some(Candidate::Bundle(read_bundle(entry, name, search_paths)));
    }
    let name = stem_with_extension(entry, MANIFEST_EXTENSION)?;
    Some(Candidate::Single(PluginDescriptor {
        path: entry.to_path_buf(),
        import_name: name.to_string(),
        search_paths: search_paths.to_vec(),
        bundle: None,
    }))
}

fn read_bundle(root: &Path, name: &str, search_paths: &[PathBuf]) -> Bundle {
    let contents = root.join(CONTENTS_DIR);
    let code_dir = contents.join(name);

    let mut snapshot = vec![contents];
    snapshot.extend(search_paths.iter().cloned());

    let mut modules = Vec::new();
    match std::fs::read_dir(&code_dir) {
        Ok(entries) => {
            for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
                if !path.is_file() {
                    continue;
                }
                let Some(module) = stem_with_extension(&path, MANIFEST_EXTENSION) else {
                    continue;
                };
                if module.starts_with('.') {
                    continue;
                }
                modules.push(PluginDescriptor {
                    import_name: format!("{name}.{module}"),
                    path,
                    search_paths: snapshot.clone(),
                    bundle: Some(name.to_string()),
                });
            }
        }
        Err(e) => {
            warn!(bundle = %name, dir = %code_dir.display(), error = %e, "Bundle has no code directory");
        }
    }
    modules.sort_by(|a, b| a.import_name.cmp(&b.import_name));

    Bundle {
        name: name.to_string(),
        root: root.to_path_buf(),
        modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowberry_paths::PathSettings;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    fn resolver(root: &TempDir) -> PathResolver {
        PathResolver::new(PathSettings {
            home: Some(root.path().join("home")),
            install_dir: Some(root.path().join("install")),
            homeless: false,
        })
    }

    #[test]
    fn test_sorted_by_base_name() {
        let root = TempDir::new().unwrap();
        let paths = resolver(&root);
        let sys = root.path().join("install").join("plugins");
        touch(&sys.join("zz.json"));
        touch(&sys.join("aa.json"));
        touch(&sys.join("mm.plugin").join("Contents").join("mm").join("main.json"));
        touch(&sys.join("readme.txt"));
        touch(&paths.user_path(PathKind::Plugins).join("nn.json"));

        let found = discover(&paths);
        let names: Vec<&str> = found.iter().map(Candidate::base_name).collect();
        assert_eq!(names, vec!["aa", "mm", "nn", "zz"]);
    }

    #[test]
    fn test_user_plugin_shadows_system_plugin() {
        let root = TempDir::new().unwrap();
        let paths = resolver(&root);
        let user = paths.user_path(PathKind::Plugins);
        touch(&user.join("about.json"));
        touch(&root.path().join("install").join("plugins").join("about.json"));

        let found = discover(&paths);
        assert_eq!(found.len(), 1);
        let Candidate::Single(d) = &found[0] else { panic!("expected single-file plugin") };
        assert!(d.path.starts_with(&user));
        assert_eq!(d.search_paths[0], user);
    }

    #[test]
    fn test_bundle_modules_and_resources() {
        let root = TempDir::new().unwrap();
        let paths = resolver(&root);
        let bundle = root.path().join("install").join("plugins").join("tab1.plugin");
        let contents = bundle.join("Contents");
        touch(&contents.join("tab1").join("settings.json"));
        touch(&contents.join("tab1").join("profiles.json"));
        touch(&contents.join("tab1").join("notes.txt"));
        touch(&contents.join("Resources").join("lang").join("english.lang"));
        fs::create_dir_all(contents.join("Resources").join("sounds")).unwrap();

        let found = discover(&paths);
        let Candidate::Bundle(b) = &found[0] else { panic!("expected bundle") };
        assert_eq!(b.name, "tab1");
        let modules: Vec<&str> = b.modules.iter().map(|m| m.import_name.as_str()).collect();
        assert_eq!(modules, vec!["tab1.profiles", "tab1.settings"]);
        assert_eq!(b.modules[0].bundle.as_deref(), Some("tab1"));
        assert_eq!(b.modules[0].search_paths[0], contents);

        let resources = b.resource_dirs();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].0, PathKind::Language);
    }

    #[test]
    fn test_bundle_without_code_dir_is_empty() {
        let root = TempDir::new().unwrap();
        let paths = resolver(&root);
        fs::create_dir_all(root.path().join("install").join("plugins").join("empty.plugin")).unwrap();

        let found = discover(&paths);
        assert_eq!(found.len(), 1);
        assert!(found[0].descriptors().is_empty());
    }
}
