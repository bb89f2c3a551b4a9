//! Raw log records and the events classified from them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timestamp::Instant;

/// A single entry from the system log, as handed to the engine.
///
/// Field names follow the log tool's JSON output, where the message text is
/// called `eventMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "eventMessage")]
    pub message: String,
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub subsystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl RawRecord {
    /// Creates a record with only the fields the classifier needs.
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
            process: String::new(),
            subsystem: String::new(),
            category: None,
            level: None,
        }
    }
}

/// Polarity of a classified event.
///
/// Every profile classifies into these two kinds; power profiles only
/// present them as wake/sleep through their [`EventKindPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Opens a session (unlock, login, wake).
    Start,
    /// Closes a session (lock, logout, sleep).
    End,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display labels for the two event kinds of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventKindPair {
    pub start: &'static str,
    pub end: &'static str,
}

impl EventKindPair {
    /// Screen lock/unlock style events.
    pub const START_END: Self = Self {
        start: "start",
        end: "end",
    };

    /// Power management events.
    pub const WAKE_SLEEP: Self = Self {
        start: "wake",
        end: "sleep",
    };

    /// Returns the label for `kind`.
    #[must_use]
    pub const fn label(&self, kind: EventKind) -> &'static str {
        match kind {
            EventKind::Start => self.start,
            EventKind::End => self.end,
        }
    }
}

/// A record that matched exactly one polarity (after precedence rules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedEvent {
    pub instant: Instant,
    pub kind: EventKind,
    pub raw_message: String,
    pub process: String,
    pub subsystem: String,
}

/// Removes records repeated across overlapping log queries.
///
/// Two records are the same when both timestamp and message match. The first
/// occurrence wins and input order is otherwise kept.
pub fn dedup_records(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert((r.timestamp.clone(), r.message.clone())))
        .collect()
}
