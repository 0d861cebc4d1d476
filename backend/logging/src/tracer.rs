//! Bus tracer
//!
//! A listener that writes every event passing over the bus to the log, so
//! the notification/command flow of a session can be reconstructed.

use snowberry_events::{listener, Event, EventBus, ListenerRef};
use tracing::debug;

/// Tracing target used for bus events. Enable with
/// `RUST_LOG=snowberry_events=debug`.
pub const EVENTS_TARGET: &str = "snowberry_events";

/// Listener that logs each event with its kind, id and JSON payload.
pub fn event_tracer() -> ListenerRef {
    listener(|event: &Event| {
        let payload = serde_json::to_string(event).unwrap_or_else(|e| format!("<unserializable: {e}>"));
        debug!(target: EVENTS_TARGET, kind = %event.kind(), id = event.id(), %payload, "Bus event");
    })
}

/// Register one tracer for both notifications and commands. The returned
/// handle removes it again via [`EventBus::remove_listener`].
pub fn attach_tracer(bus: &EventBus) -> ListenerRef {
    let tracer = event_tracer();
    bus.add_notify_listener(tracer.clone(), None);
    bus.add_command_listener(tracer.clone(), None);
    tracer
}
