//! Config validation: checks with user-friendly error messages.

use crate::schema::SnowberryConfig;
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &SnowberryConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_paths(config, &mut report);
    validate_plugins(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_paths(config: &SnowberryConfig, report: &mut ValidationReport) {
    let Some(paths) = &config.paths else { return };
    if paths.homeless == Some(true) && paths.home.is_some() {
        report.warn("paths.home", "Ignored because homeless mode is enabled");
    }
    if let Some(home) = &paths.home {
        if home.as_os_str().is_empty() {
            report.error("paths.home", "Home directory cannot be empty");
        }
    }
}

fn validate_plugins(config: &SnowberryConfig, report: &mut ValidationReport) {
    let Some(plugins) = &config.plugins else { return };
    for (i, name) in plugins.disabled.iter().enumerate() {
        if name.trim().is_empty() {
            report.error(format!("plugins.disabled[{i}]"), "Plugin name cannot be empty");
        }
    }
    for (i, dir) in plugins.extra_dirs.iter().enumerate() {
        if dir.is_relative() {
            report.warn(
                format!("plugins.extraDirs[{i}]"),
                format!("'{}' is relative and depends on the working directory", dir.display()),
            );
        }
    }
}

fn validate_logging(config: &SnowberryConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown log level '{level}'. Use one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}
