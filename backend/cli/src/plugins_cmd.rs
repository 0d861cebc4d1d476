//! `snowberry plugins`: what discovery finds, without running plugin code.

use snowberry_paths::PathResolver;
use snowberry_plugins::{PluginLoader, PluginRecord, PluginState};

use crate::terminal_output::{paint, render_table, GREEN, RED, YELLOW};

fn state_cell(state: PluginState) -> String {
    let style = match state {
        PluginState::Active | PluginState::Discovered => GREEN,
        PluginState::Failed => RED,
        PluginState::Disabled | PluginState::Imported => YELLOW,
    };
    paint(style, &state.to_string())
}

pub fn render_records(records: &[PluginRecord]) -> String {
    if records.is_empty() {
        return "No plugins found.\n".to_string();
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.import_name.clone(),
                r.display_name.clone(),
                state_cell(r.state),
                r.path.display().to_string(),
            ]
        })
        .collect();
    render_table(&["PLUGIN", "NAME", "STATE", "MANIFEST"], &rows)
}

pub fn run(loader: &PluginLoader, paths: &PathResolver) -> String {
    render_records(&loader.preview(paths))
}
