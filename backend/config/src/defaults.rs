//! Config defaults: fills unset values after loading.

use crate::schema::{LoggingConfig, PathsConfig, SnowberryConfig};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: SnowberryConfig) -> SnowberryConfig {
    let config = apply_path_defaults(config);
    apply_logging_defaults(config)
}

fn apply_path_defaults(mut config: SnowberryConfig) -> SnowberryConfig {
    let paths = config.paths.get_or_insert_with(PathsConfig::default);
    if paths.homeless.is_none() {
        paths.homeless = Some(false);
    }
    config
}

fn apply_logging_defaults(mut config: SnowberryConfig) -> SnowberryConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}
