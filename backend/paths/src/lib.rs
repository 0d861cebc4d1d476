//! `snowberry-paths`: where Snowberry looks for its resources.
//!
//! Every logical resource kind (addons, config, language files, plugins,
//! profiles, graphics, runtime state) lives in up to three layers:
//! the user's home directory, directories contributed by plugin bundles,
//! and the installation directory. Earlier layers override later ones.

pub mod kind;
pub mod resolver;

pub use kind::{PathKind, UnknownPathKind};
pub use resolver::{PathResolver, PathSettings};
