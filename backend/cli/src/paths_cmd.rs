//! `snowberry paths` and `snowberry list <kind>`.

use std::fmt::Write;
use std::path::Path;

use snowberry_paths::{PathKind, PathResolver};

use crate::terminal_output::render_table;

fn dir_cell(dir: &Path) -> String {
    if dir.is_dir() {
        dir.display().to_string()
    } else {
        format!("{} (missing)", dir.display())
    }
}

/// Every directory of every kind, in search priority order.
pub fn render_paths(paths: &PathResolver) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "home:    {}", paths.home().display());
    let _ = writeln!(out, "install: {}", paths.install_dir().display());
    if paths.is_homeless() {
        let _ = writeln!(out, "mode:    homeless");
    }
    out.push('\n');

    let mut rows = Vec::new();
    for kind in PathKind::ALL {
        rows.push(vec![kind.to_string(), "user".to_string(), dir_cell(&paths.user_path(kind))]);
        for dir in paths.bundle_paths(kind) {
            rows.push(vec![kind.to_string(), "bundle".to_string(), dir_cell(dir)]);
        }
        rows.push(vec![kind.to_string(), "system".to_string(), dir_cell(&paths.system_path(kind))]);
    }
    out.push_str(&render_table(&["KIND", "LAYER", "DIRECTORY"], &rows));
    out
}

/// Effective files of one kind, one per line.
pub fn render_list(paths: &PathResolver, kind: PathKind) -> String {
    paths
        .list_files(kind)
        .iter()
        .map(|file| format!("{}\n", file.display()))
        .collect()
}
