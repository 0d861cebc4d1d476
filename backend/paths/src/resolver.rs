//! Path Resolver
//!
//! Layering, highest priority first:
//! 1. user home (`~/.snowberry`, `%APPDATA%\Snowberry`, ... or
//!    `<install>/user` in homeless mode)
//! 2. bundle directories registered by plugin bundles, in registration order
//! 3. the installation directory

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::kind::PathKind;

/// Marker file in the install directory that turns on homeless mode.
pub const HOMELESS_MARKER: &str = "homeless";

/// Name of the user data directory inside the install dir in homeless mode.
const HOMELESS_USER_DIR: &str = "user";

/// Inputs for building a [`PathResolver`]. Every field is optional; unset
/// fields are derived from the platform and the running executable.
#[derive(Debug, Clone, Default)]
pub struct PathSettings {
    /// Use this directory as the user home instead of the platform default.
    pub home: Option<PathBuf>,
    /// Installation directory holding the system copies of resources.
    pub install_dir: Option<PathBuf>,
    /// Store user data next to the installation.
    pub homeless: bool,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    home: PathBuf,
    install_dir: PathBuf,
    homeless: bool,
    bundles: HashMap<PathKind, Vec<PathBuf>>,
    home_ready: OnceCell<()>,
}

impl PathResolver {
    pub fn new(settings: PathSettings) -> Self {
        let install_dir = settings.install_dir.unwrap_or_else(default_install_dir);
        let homeless = settings.homeless || install_dir.join(HOMELESS_MARKER).is_file();
        let home = if homeless {
            install_dir.join(HOMELESS_USER_DIR)
        } else {
            settings.home.unwrap_or_else(platform_home)
        };
        info!(home = %home.display(), install = %install_dir.display(), homeless, "Resolved Snowberry paths");
        Self {
            home,
            install_dir,
            homeless,
            bundles: HashMap::new(),
            home_ready: OnceCell::new(),
        }
    }

    pub fn is_homeless(&self) -> bool {
        self.homeless
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// The user home directory. The first call creates it together with the
    /// standard per-kind subdirectories; later calls do no file-system work.
    pub fn home(&self) -> &Path {
        self.home_ready.get_or_init(|| self.create_user_dirs());
        &self.home
    }

    fn create_user_dirs(&self) {
        for kind in PathKind::ALL {
            let dir = self.home.join(kind.dir_name());
            if dir.is_dir() {
                continue;
            }
            match fs::create_dir_all(&dir) {
                Ok(()) => debug!(dir = %dir.display(), "Created user directory"),
                Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to create user directory"),
            }
        }
    }

    pub fn user_path(&self, kind: PathKind) -> PathBuf {
        self.home().join(kind.dir_name())
    }

    pub fn system_path(&self, kind: PathKind) -> PathBuf {
        self.install_dir.join(kind.dir_name())
    }

    pub fn bundle_paths(&self, kind: PathKind) -> &[PathBuf] {
        self.bundles.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register a directory contributed by a plugin bundle. Registering the
    /// same directory twice has no effect.
    pub fn add_bundle_path(&mut self, kind: PathKind, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        let dirs = self.bundles.entry(kind).or_default();
        if dirs.contains(&dir) {
            return;
        }
        debug!(%kind, dir = %dir.display(), "Registered bundle path");
        dirs.push(dir);
    }

    /// Existing directories for `kind` in priority order: user, bundles,
    /// system. A directory reachable through two layers is listed once.
    pub fn search_paths(&self, kind: PathKind) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        std::iter::once(self.user_path(kind))
            .chain(self.bundle_paths(kind).iter().cloned())
            .chain(std::iter::once(self.system_path(kind)))
            .filter(|dir| dir.is_dir())
            .filter(|dir| seen.insert(absolute(dir)))
            .collect()
    }

    /// Regular files of `kind` across all layers. A file name found in a
    /// higher priority directory shadows the same name further down.
    pub fn list_files(&self, kind: PathKind) -> Vec<PathBuf> {
        self.list(kind, false)
    }

    /// Like [`list_files`](Self::list_files) but includes subdirectories.
    pub fn list_entries(&self, kind: PathKind) -> Vec<PathBuf> {
        self.list(kind, true)
    }

    fn list(&self, kind: PathKind, include_dirs: bool) -> Vec<PathBuf> {
        let mut names: HashSet<OsString> = HashSet::new();
        let mut paths: HashSet<PathBuf> = HashSet::new();
        let mut out = Vec::new();

        for dir in self.search_paths(kind) {
            for path in read_sorted(&dir) {
                let Some(name) = path.file_name().map(|n| n.to_os_string()) else {
                    continue;
                };
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                let wanted = if path.is_dir() { include_dirs } else { path.is_file() };
                if !wanted {
                    continue;
                }
                if names.contains(&name) {
                    debug!(path = %path.display(), "Shadowed by higher priority entry");
                    continue;
                }
                if !paths.insert(absolute(&path)) {
                    continue;
                }
                names.insert(name);
                out.push(path);
            }
        }
        out
    }
}

fn read_sorted(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to list directory");
            return Vec::new();
        }
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();
    paths
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Per-platform user home. Falls back to the working directory when the
/// platform lookup fails.
fn platform_home() -> PathBuf {
    let home = if cfg!(any(target_os = "macos", target_os = "windows")) {
        dirs::data_dir().map(|d| d.join("Snowberry"))
    } else {
        dirs::home_dir().map(|d| d.join(".snowberry"))
    };
    home_or_current_dir(home)
}

fn home_or_current_dir(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_else(|| {
        warn!("Could not determine a home directory; using the working directory");
        current_dir()
    })
}

/// Directory of the running executable, or the working directory.
fn default_install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(current_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        home: PathBuf,
        install: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = TempDir::new().unwrap();
        let home = root.path().join("home");
        let install = root.path().join("install");
        fs::create_dir_all(&install).unwrap();
        Fixture { home, install, _root: root }
    }

    fn resolver(f: &Fixture) -> PathResolver {
        PathResolver::new(PathSettings {
            home: Some(f.home.clone()),
            install_dir: Some(f.install.clone()),
            homeless: false,
        })
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_first_access_creates_user_dirs() {
        let f = fixture();
        let paths = resolver(&f);
        assert!(!f.home.exists());

        assert_eq!(paths.user_path(PathKind::Config), f.home.join("conf"));
        for kind in PathKind::ALL {
            assert!(f.home.join(kind.dir_name()).is_dir());
        }

        // Idempotent.
        assert_eq!(paths.user_path(PathKind::Addons), f.home.join("addons"));
    }

    #[test]
    fn test_homeless_mode_uses_install_dir() {
        let f = fixture();
        let paths = PathResolver::new(PathSettings {
            home: Some(f.home.clone()),
            install_dir: Some(f.install.clone()),
            homeless: true,
        });
        assert!(paths.is_homeless());
        assert_eq!(paths.user_path(PathKind::Profiles), f.install.join("user").join("profiles"));
    }

    #[test]
    fn test_homeless_marker_file() {
        let f = fixture();
        touch(&f.install.join(HOMELESS_MARKER));
        let paths = resolver(&f);
        assert!(paths.is_homeless());
        assert_eq!(paths.home(), f.install.join("user"));
    }

    #[test]
    fn test_user_shadows_system() {
        let f = fixture();
        let paths = resolver(&f);
        touch(&paths.user_path(PathKind::Addons).join("jdoom.box"));
        touch(&f.install.join("addons").join("jdoom.box"));
        touch(&f.install.join("addons").join("jheretic.box"));

        let files = paths.list_files(PathKind::Addons);
        assert_eq!(names(&files), vec!["jdoom.box", "jheretic.box"]);
        assert!(files[0].starts_with(&f.home));
        assert!(files[1].starts_with(&f.install));
    }

    #[test]
    fn test_bundle_between_user_and_system() {
        let f = fixture();
        let mut paths = resolver(&f);
        let bundle = f.install.join("plugins").join("extra.plugin").join("Contents").join("Resources").join("lang");
        touch(&bundle.join("english.lang"));
        touch(&bundle.join("finnish.lang"));
        touch(&paths.user_path(PathKind::Language).join("finnish.lang"));
        touch(&f.install.join("lang").join("english.lang"));
        touch(&f.install.join("lang").join("german.lang"));

        paths.add_bundle_path(PathKind::Language, &bundle);
        paths.add_bundle_path(PathKind::Language, &bundle);
        assert_eq!(paths.bundle_paths(PathKind::Language).len(), 1);

        let files = paths.list_files(PathKind::Language);
        assert_eq!(names(&files), vec!["finnish.lang", "english.lang", "german.lang"]);
        assert!(files[0].starts_with(&f.home));
        assert!(files[1].starts_with(&bundle));
        assert!(files[2].starts_with(f.install.join("lang")));
    }

    #[test]
    fn test_no_duplicate_absolute_paths() {
        let f = fixture();
        // Install dir doubles as the user home.
        let paths = PathResolver::new(PathSettings {
            home: Some(f.install.clone()),
            install_dir: Some(f.install.clone()),
            homeless: false,
        });
        touch(&f.install.join("conf").join("snowberry.conf"));

        let files = paths.list_files(PathKind::Config);
        assert_eq!(files.len(), 1);
        assert_eq!(paths.search_paths(PathKind::Config).len(), 1);
    }

    #[test]
    fn test_list_entries_includes_directories() {
        let f = fixture();
        let paths = resolver(&f);
        fs::create_dir_all(f.install.join("plugins").join("tab1.plugin")).unwrap();
        touch(&f.install.join("plugins").join("about.json"));
        touch(&f.install.join("plugins").join(".hidden.json"));

        assert_eq!(names(&paths.list_entries(PathKind::Plugins)), vec!["about.json", "tab1.plugin"]);
        assert_eq!(names(&paths.list_files(PathKind::Plugins)), vec!["about.json"]);
    }

    #[test]
    fn test_home_falls_back_to_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(home_or_current_dir(None), cwd);
        assert_eq!(home_or_current_dir(Some(PathBuf::from("/h/.snowberry"))), PathBuf::from("/h/.snowberry"));
    }

    #[test]
    fn test_missing_system_dir_is_skipped() {
        let f = fixture();
        let paths = resolver(&f);
        let search = paths.search_paths(PathKind::Graphics);
        assert_eq!(search, vec![f.home.join("graphics")]);
        assert!(paths.list_files(PathKind::Graphics).is_empty());
    }
}
