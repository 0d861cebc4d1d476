//! Event Bus
//!
//! Synchronous multicast of notifications and commands to registered
//! listeners. Dispatch happens on the caller's thread, in registration
//! order. The bus does not isolate listeners from each other: a listener
//! that panics unwinds through `send`.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use crate::types::{Command, Event, EventKind, Notification};

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Receives events from the bus.
///
/// Implemented for every `Fn(&Event) + Send + Sync` closure.
pub trait Listener: Send + Sync {
    fn handle(&self, event: &Event);
}

impl<F> Listener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn handle(&self, event: &Event) {
        self(event)
    }
}

/// Shared listener handle. The same handle is used to remove the listener.
pub type ListenerRef = Arc<dyn Listener>;

/// Wrap a closure into a [`ListenerRef`].
pub fn listener<F>(f: F) -> ListenerRef
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(f)
}

// ---------------------------------------------------------------------------
// Id filter
// ---------------------------------------------------------------------------

/// Set of event ids a registration accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdFilter {
    ids: HashSet<String>,
}

impl IdFilter {
    pub fn of<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    pub fn accepts(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

struct Registration {
    listener: ListenerRef,
    filter: Option<IdFilter>,
}

impl Registration {
    fn accepts(&self, id: &str) -> bool {
        match &self.filter {
            Some(filter) => filter.accepts(id),
            None => true,
        }
    }
}

#[derive(Default)]
struct BusState {
    notify: Vec<Registration>,
    command: Vec<Registration>,
    mute_depth: usize,
    pending: VecDeque<Event>,
}

impl BusState {
    fn registrations(&self, kind: EventKind) -> &Vec<Registration> {
        match kind {
            EventKind::Notify => &self.notify,
            EventKind::Command => &self.command,
        }
    }

    fn registrations_mut(&mut self, kind: EventKind) -> &mut Vec<Registration> {
        match kind {
            EventKind::Notify => &mut self.notify,
            EventKind::Command => &mut self.command,
        }
    }
}

/// Shared handle to the notification/command bus. Clones refer to the same
/// listener registry, so a handle can be given to each plugin at init time.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("EventBus")
            .field("notify_listeners", &state.notify.len())
            .field("command_listeners", &state.command.len())
            .field("mute_depth", &state.mute_depth)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn add_listener(&self, kind: EventKind, listener: ListenerRef, filter: Option<IdFilter>) {
        let mut state = self.lock();
        state.registrations_mut(kind).push(Registration { listener, filter });
        debug!(%kind, count = state.registrations(kind).len(), "Listener registered");
    }

    /// Register a listener for notifications. With a filter, only
    /// notifications whose id is in the set are delivered.
    pub fn add_notify_listener(&self, listener: ListenerRef, filter: Option<IdFilter>) {
        self.add_listener(EventKind::Notify, listener, filter);
    }

    /// Register a listener for commands. With a filter, only commands whose
    /// id is in the set are delivered.
    pub fn add_command_listener(&self, listener: ListenerRef, filter: Option<IdFilter>) {
        self.add_listener(EventKind::Command, listener, filter);
    }

    /// Remove every registration of `listener`, of either kind.
    /// Returns the number of registrations removed.
    pub fn remove_listener(&self, listener: &ListenerRef) -> usize {
        let target = Arc::as_ptr(listener);
        let mut state = self.lock();
        let mut removed = 0;
        for kind in [EventKind::Notify, EventKind::Command] {
            let regs = state.registrations_mut(kind);
            let before = regs.len();
            regs.retain(|r| !std::ptr::addr_eq(Arc::as_ptr(&r.listener), target));
            removed += before - regs.len();
        }
        debug!(removed, "Listener removed");
        removed
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().registrations(kind).len()
    }

    /// Deliver `event` to every matching listener of its kind, in
    /// registration order.
    ///
    /// Registrations added or removed by a listener during dispatch take
    /// effect from the next `send`.
    pub fn send(&self, event: impl Into<Event>) {
        let event = event.into();
        let kind = event.kind();
        let targets: Vec<ListenerRef> = {
            let state = self.lock();
            if kind == EventKind::Notify && state.mute_depth > 0 {
                trace!(id = event.id(), "Notification dropped while muted");
                return;
            }
            state
                .registrations(kind)
                .iter()
                .filter(|r| r.accepts(event.id()))
                .map(|r| Arc::clone(&r.listener))
                .collect()
        };

        trace!(%kind, id = event.id(), listeners = targets.len(), "Dispatching event");
        for target in targets {
            target.handle(&event);
        }
    }

    pub fn notify(&self, notification: Notification) {
        self.send(Event::Notify(notification));
    }

    pub fn command(&self, command: Command) {
        self.send(Event::Command(command));
    }

    /// Queue an event for delivery on the next [`flush`](Self::flush).
    pub fn post(&self, event: impl Into<Event>) {
        self.lock().pending.push_back(event.into());
    }

    /// Deliver queued events in FIFO order. Events posted by listeners while
    /// flushing are delivered by the same call. Returns how many were sent.
    pub fn flush(&self) -> usize {
        let mut sent = 0;
        loop {
            let next = self.lock().pending.pop_front();
            let Some(event) = next else { break };
            self.send(event);
            sent += 1;
        }
        sent
    }

    /// Suppress notifications until the matching [`unmute`](Self::unmute).
    /// Nested calls stack. Commands are never muted.
    pub fn mute(&self) {
        self.lock().mute_depth += 1;
    }

    pub fn unmute(&self) {
        let mut state = self.lock();
        if state.mute_depth == 0 {
            warn!("unmute called on a bus that is not muted");
            return;
        }
        state.mute_depth -= 1;
    }

    pub fn is_muted(&self) -> bool {
        self.lock().mute_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProfileRef, ValueChange};

    /// Listener that records the ids it receives under a tag.
    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> ListenerRef {
        let log = Arc::clone(log);
        listener(move |e: &Event| log.lock().unwrap().push(format!("{tag}:{}", e.id())))
    }

    fn new_log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_registration_order() {
        let bus = EventBus::new();
        let log = new_log();
        bus.add_notify_listener(recorder("a", &log), None);
        bus.add_notify_listener(recorder("b", &log), None);
        bus.add_notify_listener(recorder("c", &log), None);

        bus.notify(Notification::InitDone);

        assert_eq!(*log.lock().unwrap(), vec!["a:init-done", "b:init-done", "c:init-done"]);
    }

    #[test]
    fn test_filter_by_id() {
        let bus = EventBus::new();
        let log = new_log();
        bus.add_notify_listener(recorder("a", &log), Some(IdFilter::of(["x"])));

        bus.notify(Notification::custom("x"));
        bus.notify(Notification::custom("y"));

        assert_eq!(*log.lock().unwrap(), vec!["a:x"]);
    }

    #[test]
    fn test_kinds_are_separate() {
        let bus = EventBus::new();
        let log = new_log();
        bus.add_notify_listener(recorder("n", &log), None);
        bus.add_command_listener(recorder("c", &log), Some(IdFilter::of(["play"])));

        bus.command(Command::Play);
        bus.command(Command::Quit);
        bus.notify(Notification::Launched(ProfileRef { profile: "doom".into() }));

        assert_eq!(*log.lock().unwrap(), vec!["c:play", "n:launched"]);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let bus = EventBus::new();
        let log = new_log();
        let l = recorder("a", &log);
        bus.add_notify_listener(Arc::clone(&l), None);
        bus.add_notify_listener(Arc::clone(&l), Some(IdFilter::of(["value-changed"])));

        bus.notify(Notification::ValueChanged(ValueChange {
            setting: "game-mode".into(),
            value: "deathmatch".into(),
        }));
        bus.notify(Notification::InitDone);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:value-changed", "a:value-changed", "a:init-done"]
        );
    }

    #[test]
    fn test_remove_listener_drops_all_registrations() {
        let bus = EventBus::new();
        let log = new_log();
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        bus.add_notify_listener(Arc::clone(&a), None);
        bus.add_command_listener(Arc::clone(&a), None);
        bus.add_notify_listener(Arc::clone(&b), None);

        assert_eq!(bus.remove_listener(&a), 2);
        assert_eq!(bus.listener_count(EventKind::Notify), 1);
        assert_eq!(bus.listener_count(EventKind::Command), 0);

        bus.notify(Notification::InitDone);
        bus.command(Command::Quit);
        assert_eq!(*log.lock().unwrap(), vec!["b:init-done"]);
    }

    #[test]
    fn test_mute_suppresses_notifications_only() {
        let bus = EventBus::new();
        let log = new_log();
        bus.add_notify_listener(recorder("n", &log), None);
        bus.add_command_listener(recorder("c", &log), None);

        bus.mute();
        bus.mute();
        bus.notify(Notification::InitDone);
        bus.command(Command::Play);
        bus.unmute();
        assert!(bus.is_muted());
        bus.notify(Notification::Quitting);
        bus.unmute();
        assert!(!bus.is_muted());
        bus.notify(Notification::Quitting);
        // Extra unmute is ignored.
        bus.unmute();

        assert_eq!(*log.lock().unwrap(), vec!["c:play", "n:quitting"]);
    }

    #[test]
    fn test_post_and_flush_fifo() {
        let bus = EventBus::new();
        let log = new_log();
        bus.add_notify_listener(recorder("n", &log), None);

        let chained = bus.clone();
        bus.add_command_listener(
            listener(move |_e: &Event| chained.post(Notification::custom("after-quit"))),
            Some(IdFilter::of(["quit"])),
        );

        bus.post(Notification::custom("first"));
        bus.post(Command::Quit);
        bus.post(Notification::custom("second"));
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(bus.flush(), 4);
        assert_eq!(*log.lock().unwrap(), vec!["n:first", "n:second", "n:after-quit"]);
        assert_eq!(bus.flush(), 0);
    }

    #[test]
    fn test_register_during_dispatch_applies_next_send() {
        let bus = EventBus::new();
        let log = new_log();
        let inner_log = Arc::clone(&log);
        let handle = bus.clone();
        bus.add_notify_listener(
            listener(move |_e: &Event| {
                handle.add_notify_listener(recorder("late", &inner_log), None);
            }),
            Some(IdFilter::of(["init-done"])),
        );

        bus.notify(Notification::InitDone);
        assert!(log.lock().unwrap().is_empty());

        bus.notify(Notification::custom("x"));
        assert_eq!(*log.lock().unwrap(), vec!["late:x"]);
    }

    #[test]
    fn test_plugin_a_hears_plugin_b() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));

        // plugin A
        let counter = Arc::clone(&hits);
        bus.add_notify_listener(
            listener(move |_e: &Event| *counter.lock().unwrap() += 1),
            Some(IdFilter::of(["x"])),
        );

        // plugin B
        let b = bus.clone();
        b.send(Notification::custom("x"));
        b.send(Notification::custom("y"));

        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
