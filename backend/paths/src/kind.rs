use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical resource kind. Each maps to a fixed subdirectory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Addons,
    Config,
    Language,
    Plugins,
    Profiles,
    Graphics,
    Runtime,
}

impl PathKind {
    pub const ALL: [PathKind; 7] = [
        PathKind::Addons,
        PathKind::Config,
        PathKind::Language,
        PathKind::Plugins,
        PathKind::Profiles,
        PathKind::Graphics,
        PathKind::Runtime,
    ];

    /// Directory name used under the user home and the install directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            PathKind::Addons => "addons",
            PathKind::Config => "conf",
            PathKind::Language => "lang",
            PathKind::Plugins => "plugins",
            PathKind::Profiles => "profiles",
            PathKind::Graphics => "graphics",
            PathKind::Runtime => "runtime",
        }
    }

    /// Inverse of [`dir_name`](Self::dir_name).
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dir_name() == name)
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Error)]
#[error("unknown path kind '{0}'")]
pub struct UnknownPathKind(pub String);

impl FromStr for PathKind {
    type Err = UnknownPathKind;

    /// Accepts either the directory name (`conf`) or the kind name (`config`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(kind) = Self::from_dir_name(&lower) {
            return Ok(kind);
        }
        match lower.as_str() {
            "config" => Ok(PathKind::Config),
            "language" => Ok(PathKind::Language),
            _ => Err(UnknownPathKind(s.to_string())),
        }
    }
}
