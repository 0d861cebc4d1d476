//! Plugins compiled into the `snowberry` binary.
//!
//! A plugin becomes active when a manifest with its import name
//! (`event-log.json`, `launcher.json`) is found on the plugin search path.

use std::sync::{Arc, Mutex, MutexGuard};

use snowberry_core::Severity;
use snowberry_events::{listener, Command, Event, IdFilter, Notification, ProfileRef};
use snowberry_logging::attach_tracer;
use snowberry_plugins::{Plugin, PluginCatalog, PluginContext};
use tracing::info;

pub const EVENT_LOG: &str = "event-log";
pub const LAUNCHER: &str = "launcher";

/// Catalog with every builtin plugin registered.
pub fn catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    catalog.register(EVENT_LOG, || Ok(Box::new(EventLog) as Box<dyn Plugin>));
    catalog.register(LAUNCHER, || Ok(Box::new(Launcher::default()) as Box<dyn Plugin>));
    catalog
}

/// Traces all bus traffic.
struct EventLog;

impl Plugin for EventLog {
    fn name(&self) -> &str {
        EVENT_LOG
    }

    fn init(&self, ctx: &PluginContext<'_>) -> anyhow::Result<()> {
        attach_tracer(ctx.bus);
        Ok(())
    }
}

/// Tracks the active profile and answers play/quit commands with
/// notifications.
#[derive(Default)]
pub struct Launcher {
    active: Arc<Mutex<Option<String>>>,
}

fn lock(active: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Launcher {
    pub fn active_profile(&self) -> Option<String> {
        lock(&self.active).clone()
    }
}

impl Plugin for Launcher {
    fn name(&self) -> &str {
        LAUNCHER
    }

    fn init(&self, ctx: &PluginContext<'_>) -> anyhow::Result<()> {
        let bus = ctx.bus.clone();
        let issues = ctx.issues.clone();
        let active = Arc::clone(&self.active);

        let handler = listener(move |event: &Event| {
            let Some(command) = event.as_command() else {
                return;
            };
            match command {
                Command::SelectProfile(profile) => {
                    *lock(&active) = Some(profile.profile.clone());
                    bus.notify(Notification::ActiveProfileChanged(profile.clone()));
                }
                Command::Play => {
                    let current = lock(&active).clone();
                    match current {
                        Some(profile) => {
                            info!(%profile, "Launching");
                            bus.notify(Notification::Launched(ProfileRef { profile }));
                        }
                        None => issues.add(
                            Severity::Medium,
                            "launch-without-profile",
                            "Play requested but no profile is selected",
                        ),
                    }
                }
                Command::Quit => bus.notify(Notification::Quitting),
                _ => {}
            }
        });
        ctx.bus.add_command_listener(
            handler,
            Some(IdFilter::of(["select-profile", "play", "quit"])),
        );
        Ok(())
    }
}
