//! Runtime settings: command-line flags layered over `config.yaml`.

use std::path::{Path, PathBuf};

use clap::Args;
use snowberry_config::SnowberryConfig;
use snowberry_paths::{PathKind, PathResolver, PathSettings};

/// Flags accepted by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Config file to read (default: <config dir>/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use this directory as the user home
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Keep user data inside the installation directory
    #[arg(long, global = true)]
    pub homeless: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: SnowberryConfig,
    pub paths: PathSettings,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub log_json: bool,
}

impl Settings {
    /// Flags win over the config file; the config file wins over defaults.
    pub fn resolve(args: &GlobalArgs, config: SnowberryConfig, config_dir: &Path) -> Self {
        let file_paths = config.paths.clone().unwrap_or_default();
        let paths = PathSettings {
            home: args.home.clone().or(file_paths.home),
            install_dir: file_paths.install_dir,
            homeless: args.homeless || config.homeless(),
        };

        let logging = config.logging.clone().unwrap_or_default();
        let log_level = args
            .log_level
            .clone()
            .unwrap_or_else(|| config.log_level().to_string());
        let log_dir = logging.dir.unwrap_or_else(|| config_dir.join("logs"));

        Self {
            paths,
            log_level,
            log_dir,
            log_json: logging.json.unwrap_or(false),
            config,
        }
    }

    /// Build the path resolver, with configured extra plugin directories
    /// searched between the user and system layers.
    pub fn path_resolver(&self) -> PathResolver {
        let mut resolver = PathResolver::new(self.paths.clone());
        for dir in self.config.extra_plugin_dirs() {
            resolver.add_bundle_path(PathKind::Plugins, dir);
        }
        resolver
    }
}
