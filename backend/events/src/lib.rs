//! `snowberry-events`: in-process notification and command bus.
//!
//! Notifications announce state changes; commands request an action.
//! Both are dispatched synchronously to the listeners registered for that
//! kind, in registration order, filtered by event id.

pub mod bus;
pub mod types;

pub use bus::{listener, EventBus, IdFilter, Listener, ListenerRef};
pub use types::{
    AreaRef, Command, CustomEvent, Event, EventKind, Notification, ProfileRef, Selection,
    ValueChange,
};
