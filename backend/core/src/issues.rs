//! Severity-tagged issue log.
//!
//! Problems that should reach the user (a plugin that failed to load, a
//! config file that could not be parsed) are collected here while the
//! launcher starts up. The front-end drains the log with [`IssueLog::take`]
//! so each issue is shown exactly once.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

/// How serious an issue is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

/// A single recorded issue.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Stable identifier, e.g. `plugin-import-failed`.
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.id, self.message)
    }
}

/// Shared handle to the issue log. Clones refer to the same log.
#[derive(Debug, Clone, Default)]
pub struct IssueLog {
    entries: Arc<Mutex<Vec<Issue>>>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Issue>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an issue. It is also emitted as a tracing event at a level
    /// matching its severity.
    pub fn add(&self, severity: Severity, id: impl Into<String>, message: impl Into<String>) {
        let issue = Issue {
            severity,
            id: id.into(),
            message: message.into(),
            timestamp: Utc::now(),
        };
        match severity {
            Severity::High => error!(issue = %issue.id, "{}", issue.message),
            Severity::Medium => warn!(issue = %issue.id, "{}", issue.message),
            Severity::Low => info!(issue = %issue.id, "{}", issue.message),
        }
        self.lock().push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// The most severe pending issue, if any.
    pub fn highest(&self) -> Option<Severity> {
        self.lock().iter().map(|i| i.severity).max()
    }

    /// Copy of the pending issues, oldest first.
    pub fn snapshot(&self) -> Vec<Issue> {
        self.lock().clone()
    }

    /// Drain all pending issues, oldest first.
    pub fn take(&self) -> Vec<Issue> {
        std::mem::take(&mut *self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_take_drains_once() {
        let log = IssueLog::new();
        log.add(Severity::Low, "a", "first");
        log.add(Severity::High, "b", "second");

        let issues = log.take();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, "a");
        assert_eq!(issues[1].id, "b");
        assert!(log.is_empty());
        assert!(log.take().is_empty());
    }

    #[test]
    fn test_highest_severity() {
        let log = IssueLog::new();
        assert_eq!(log.highest(), None);
        log.add(Severity::Medium, "m", "medium");
        log.add(Severity::Low, "l", "low");
        assert_eq!(log.highest(), Some(Severity::Medium));
    }

    #[test]
    fn test_clones_share_entries() {
        let log = IssueLog::new();
        let other = log.clone();
        other.add(Severity::High, "plugin-init-failed", "boom");
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshot()[0].to_string(), "[high] plugin-init-failed: boom");
    }
}
