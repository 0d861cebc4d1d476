//! Shared launcher state: the user-facing issue log.

pub mod issues;

pub use issues::{Issue, IssueLog, Severity};
