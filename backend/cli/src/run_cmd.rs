//! `snowberry run`: load every plugin and drive one launcher session.

use std::fmt::Write;

use snowberry_core::{Issue, IssueLog};
use snowberry_events::{Command, EventBus, Notification, ProfileRef};
use snowberry_paths::PathResolver;
use snowberry_plugins::PluginLoader;
use tracing::info;

use crate::terminal_output::format_issue;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Profile to select once initialization is done.
    pub profile: Option<String>,
    /// Send a play command after selecting the profile.
    pub play: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    /// Active plugins in init order.
    pub loaded: Vec<String>,
    pub failed: usize,
    /// Posted events delivered after initialization.
    pub flushed: usize,
    pub issues: Vec<Issue>,
}

pub fn run(loader: &PluginLoader, mut paths: PathResolver, options: &RunOptions) -> RunOutcome {
    let bus = EventBus::new();
    let issues = IssueLog::new();

    let report = loader.load_all(&mut paths, &bus, &issues);
    bus.notify(Notification::InitDone);
    let flushed = bus.flush();

    if let Some(profile) = &options.profile {
        bus.command(Command::SelectProfile(ProfileRef { profile: profile.clone() }));
    }
    if options.play {
        bus.command(Command::Play);
    }
    bus.command(Command::Quit);
    let flushed = flushed + bus.flush();
    info!(active = report.loaded().len(), flushed, "Session finished");

    RunOutcome {
        loaded: report.loaded().into_iter().map(String::from).collect(),
        failed: report.failures.len(),
        flushed,
        issues: issues.take(),
    }
}

pub fn render(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    if outcome.loaded.is_empty() {
        let _ = writeln!(out, "No plugins loaded.");
    } else {
        let _ = writeln!(out, "Loaded: {}", outcome.loaded.join(", "));
    }
    if outcome.failed > 0 {
        let _ = writeln!(out, "Failed: {}", outcome.failed);
    }
    if !outcome.issues.is_empty() {
        let _ = writeln!(out, "\nIssues:");
        for issue in &outcome.issues {
            let _ = writeln!(out, "  {}", format_issue(issue));
        }
    }
    out
}
