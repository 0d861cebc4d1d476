mod builtins;
mod paths_cmd;
mod plugins_cmd;
mod run_cmd;
mod settings;
mod terminal_output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use snowberry_config::{config_dir, config_file_path, load_and_prepare};
use snowberry_paths::PathKind;
use snowberry_plugins::PluginLoader;
use tracing::debug;

use run_cmd::RunOptions;
use settings::{GlobalArgs, Settings};
use terminal_output::{note_error, note_success};

#[derive(Parser)]
#[command(name = "snowberry")]
#[command(about = "Snowberry: game launcher core with plugins, events and layered resource paths")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the user, bundle and system directory of every resource kind
    Paths,
    /// List the effective files of one resource kind
    List {
        /// Resource kind (addons, conf, lang, plugins, profiles, graphics, runtime)
        kind: PathKind,
    },
    /// Show discovered plugins and their state without loading them
    Plugins,
    /// Load all plugins and run a launcher session
    Run {
        /// Profile to select after initialization
        #[arg(long)]
        profile: Option<String>,
        /// Launch the selected profile
        #[arg(long)]
        play: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Install the logger. A log file that cannot be opened is reported and
/// logging continues on the console only. Returns whether file logging is
/// active.
fn start_logging(settings: &Settings) -> bool {
    match snowberry_logging::init_logger(&settings.log_dir, &settings.log_level, settings.log_json) {
        Ok(()) => true,
        Err(e) => {
            note_error(&format!("{e:#}; logging to the console only"));
            false
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_dir = config_dir();
    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir));
    let config = load_and_prepare(&config_path)?;
    let settings = Settings::resolve(&cli.global, config, &config_dir);

    start_logging(&settings);
    debug!(config = %config_path.display(), "Configuration loaded");

    let loader = || {
        PluginLoader::new(builtins::catalog())
            .with_disabled(settings.config.disabled_plugins().iter().cloned())
    };

    match cli.command {
        Commands::Paths => {
            print!("{}", paths_cmd::render_paths(&settings.path_resolver()));
        }
        Commands::List { kind } => {
            print!("{}", paths_cmd::render_list(&settings.path_resolver(), kind));
        }
        Commands::Plugins => {
            print!("{}", plugins_cmd::run(&loader(), &settings.path_resolver()));
        }
        Commands::Run { profile, play } => {
            let options = RunOptions { profile, play };
            let outcome = run_cmd::run(&loader(), settings.path_resolver(), &options);
            print!("{}", run_cmd::render(&outcome));
            if outcome.failed == 0 {
                note_success("All plugins loaded");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowberry_config::SnowberryConfig;
    use tempfile::TempDir;

    #[test]
    fn test_unusable_log_dir_is_not_fatal() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("logs");
        std::fs::write(&blocker, "").unwrap();
        let mut settings =
            Settings::resolve(&GlobalArgs::default(), SnowberryConfig::default(), root.path());
        settings.log_dir = blocker.join("nested");

        assert!(!start_logging(&settings));
    }
}
