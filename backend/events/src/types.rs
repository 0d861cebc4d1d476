//! Event kinds and their typed payloads.
//!
//! Each notification and command has a stable string id (e.g.
//! `value-changed`, `play`). Listeners filter on that id; the payload type
//! is fixed by the variant.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The two dispatch categories of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A broadcast announcement of a state change.
    Notify,
    /// A request for an action, usually handled by a single listener.
    Command,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Notify => f.write_str("notify"),
            EventKind::Command => f.write_str("command"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Identifies a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub profile: String,
}

/// A setting that took a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    pub setting: String,
    pub value: String,
}

/// A selection made in a list or choice widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub widget: String,
    pub selection: String,
}

/// A UI area being (re)built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRef {
    pub area: String,
}

/// A plugin-defined event with a free-form payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl CustomEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), data: serde_json::Value::Null }
    }

    pub fn with_data(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self { id: id.into(), data }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notification {
    /// All plugins have been initialized.
    InitDone,
    ActiveProfileChanged(ProfileRef),
    ActiveProfileRefreshed(ProfileRef),
    ValueChanged(ValueChange),
    SelectionChanged(Selection),
    PopulatingArea(AreaRef),
    AreaPopulated(AreaRef),
    LanguageChanged { language: String },
    /// The game was started with the given profile.
    Launched(ProfileRef),
    Quitting,
    Custom(CustomEvent),
}

impl Notification {
    pub fn id(&self) -> &str {
        match self {
            Self::InitDone => "init-done",
            Self::ActiveProfileChanged(_) => "active-profile-changed",
            Self::ActiveProfileRefreshed(_) => "active-profile-refreshed",
            Self::ValueChanged(_) => "value-changed",
            Self::SelectionChanged(_) => "selection-changed",
            Self::PopulatingArea(_) => "populating-area",
            Self::AreaPopulated(_) => "area-populated",
            Self::LanguageChanged { .. } => "language-changed",
            Self::Launched(_) => "launched",
            Self::Quitting => "quitting",
            Self::Custom(custom) => &custom.id,
        }
    }

    pub fn custom(id: impl Into<String>) -> Self {
        Self::Custom(CustomEvent::new(id))
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Launch the game using the active profile.
    Play,
    Quit,
    ShowSnowberrySettings,
    NewProfile,
    /// Switch the active profile.
    SelectProfile(ProfileRef),
    Custom(CustomEvent),
}

impl Command {
    pub fn id(&self) -> &str {
        match self {
            Self::Play => "play",
            Self::Quit => "quit",
            Self::ShowSnowberrySettings => "show-snowberry-settings",
            Self::NewProfile => "new-profile",
            Self::SelectProfile(_) => "select-profile",
            Self::Custom(custom) => &custom.id,
        }
    }

    pub fn custom(id: impl Into<String>) -> Self {
        Self::Custom(CustomEvent::new(id))
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Anything that can travel over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum Event {
    Notify(Notification),
    Command(Command),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Notify(_) => EventKind::Notify,
            Self::Command(_) => EventKind::Command,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Notify(n) => n.id(),
            Self::Command(c) => c.id(),
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id() == id
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Self::Notify(n) => Some(n),
            Self::Command(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(c) => Some(c),
            Self::Notify(_) => None,
        }
    }
}

impl From<Notification> for Event {
    fn from(n: Notification) -> Self {
        Self::Notify(n)
    }
}

impl From<Command> for Event {
    fn from(c: Command) -> Self {
        Self::Command(c)
    }
}
