//! Structured logging for Snowberry.
//!
//! Console and rolling file output through `tracing`, plus a bus listener
//! that traces every notification and command.

pub mod logger;
pub mod tracer;

pub use logger::init_logger;
pub use tracer::{attach_tracer, event_tracer, EVENTS_TARGET};
