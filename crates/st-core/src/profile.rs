//! Built-in analysis profiles.
//!
//! A profile bundles what differs between log sources: the pattern table,
//! suppression substrings, the label pair used for output, and the log
//! predicates that select its records.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, PatternTable};
use crate::record::EventKind::{End, Start};
use crate::record::{EventKind, EventKindPair};

const LOGINWINDOW_PATTERNS: &[(EventKind, &str)] = &[
    (Start, r"screen.*unlock"),
    (Start, r"loginwindow.*start"),
    (Start, r"display.*wake"),
    (Start, r"wake.*display"),
    (Start, r"sessionunlocked.*1"),
    (Start, r"screenislocked.*0"),
    (Start, r"loginwindow.*login"),
    (Start, r"user.*login"),
    (Start, r"loginwindow.*unlock"),
    (Start, r"loginwindow.*wake"),
    (Start, r"loginwindow.*resume"),
    (Start, r"loginwindow.*activate"),
    (End, r"screen.*lock"),
    (End, r"loginwindow.*stop"),
    (End, r"display.*sleep"),
    (End, r"sleep.*display"),
    (End, r"sessionunlocked.*0"),
    (End, r"screenislocked.*1"),
    (End, r"loginwindow.*logout"),
    (End, r"user.*logout"),
    (End, r"loginwindow.*lock"),
    (End, r"loginwindow.*sleep"),
    (End, r"loginwindow.*suspend"),
    (End, r"loginwindow.*deactivate"),
];

const LOGINWINDOW_EXTENDED_PATTERNS: &[(EventKind, &str)] = &[
    (Start, r"screen.*unlock"),
    (Start, r"loginwindow.*start"),
    (Start, r"display.*wake"),
    (Start, r"wake.*display"),
    (Start, r"loginwindow.*login"),
    (Start, r"user.*login"),
    (Start, r"session.*start"),
    (Start, r"windowserver.*start"),
    (Start, r"display.*power.*on"),
    (Start, r"sessionunlocked.*1"),
    (Start, r"screenislocked.*0"),
    (Start, r"loginwindow.*unlock"),
    (Start, r"loginwindow.*wake"),
    (Start, r"loginwindow.*resume"),
    (Start, r"loginwindow.*activate"),
    (End, r"screen.*lock"),
    (End, r"loginwindow.*stop"),
    (End, r"display.*sleep"),
    (End, r"sleep.*display"),
    (End, r"loginwindow.*logout"),
    (End, r"user.*logout"),
    (End, r"session.*end"),
    (End, r"windowserver.*stop"),
    (End, r"display.*power.*off"),
    (End, r"sessionunlocked.*0"),
    (End, r"screenislocked.*1"),
    (End, r"loginwindow.*lock"),
    (End, r"loginwindow.*sleep"),
    (End, r"loginwindow.*suspend"),
    (End, r"loginwindow.*deactivate"),
];

const POWERCHIME_PATTERNS: &[(EventKind, &str)] = &[
    (Start, r"did wake"),
    (Start, r"didwake"),
    (End, r"did sleep"),
    (End, r"didsleep"),
];

/// Lid open/close chatter carries lock vocabulary but is not a session edge.
const CLAMSHELL: &[&str] = &["clamshell"];

static LOGINWINDOW_TABLE: LazyLock<PatternTable> =
    LazyLock::new(|| PatternTable::new(LOGINWINDOW_PATTERNS).unwrap());
static LOGINWINDOW_EXTENDED_TABLE: LazyLock<PatternTable> =
    LazyLock::new(|| PatternTable::new(LOGINWINDOW_EXTENDED_PATTERNS).unwrap());
static POWERCHIME_TABLE: LazyLock<PatternTable> =
    LazyLock::new(|| PatternTable::new(POWERCHIME_PATTERNS).unwrap());

/// Which log source and rule set to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Profile {
    /// Screen lock/unlock events from `loginwindow`.
    #[default]
    #[serde(rename = "loginwindow")]
    Loginwindow,
    /// `loginwindow` plus `WindowServer`/`Dock`, with a wider rule set.
    #[serde(rename = "loginwindow-extended")]
    LoginwindowExtended,
    /// Wake/sleep events from `PowerChime`.
    #[serde(rename = "powerchime")]
    PowerChime,
}

impl Profile {
    pub const ALL: [Self; 3] = [Self::Loginwindow, Self::LoginwindowExtended, Self::PowerChime];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loginwindow => "loginwindow",
            Self::LoginwindowExtended => "loginwindow-extended",
            Self::PowerChime => "powerchime",
        }
    }

    /// Output labels for the profile's event kinds.
    #[must_use]
    pub const fn kinds(&self) -> EventKindPair {
        match self {
            Self::Loginwindow | Self::LoginwindowExtended => EventKindPair::START_END,
            Self::PowerChime => EventKindPair::WAKE_SLEEP,
        }
    }

    /// Built-in suppression substrings.
    #[must_use]
    pub const fn suppressions(&self) -> &'static [&'static str] {
        match self {
            Self::Loginwindow | Self::LoginwindowExtended => CLAMSHELL,
            Self::PowerChime => &[],
        }
    }

    /// `log show --predicate` expressions that select this profile's records.
    #[must_use]
    pub const fn predicates(&self) -> &'static [&'static str] {
        match self {
            Self::Loginwindow => &[r#"process == "loginwindow""#],
            Self::LoginwindowExtended => &[
                r#"process == "loginwindow""#,
                r#"process == "WindowServer""#,
                r#"process == "Dock""#,
                r#"subsystem == "com.apple.loginwindow""#,
                r#"subsystem == "com.apple.windowserver""#,
            ],
            Self::PowerChime => &[r#"process == "PowerChime""#],
        }
    }

    /// The compiled pattern table.
    pub fn table(&self) -> &'static PatternTable {
        match self {
            Self::Loginwindow => &*LOGINWINDOW_TABLE,
            Self::LoginwindowExtended => &*LOGINWINDOW_EXTENDED_TABLE,
            Self::PowerChime => &*POWERCHIME_TABLE,
        }
    }

    /// Builds a classifier with the built-in suppressions plus `extra`.
    pub fn classifier(&self, extra: &[String]) -> Classifier {
        let suppressions = self
            .suppressions()
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str));
        Classifier::new(self.table().clone(), suppressions)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loginwindow" => Ok(Self::Loginwindow),
            "loginwindow-extended" => Ok(Self::LoginwindowExtended),
            "powerchime" => Ok(Self::PowerChime),
            _ => Err(format!(
                "invalid profile: {s} (expected loginwindow, loginwindow-extended or powerchime)"
            )),
        }
    }
}
