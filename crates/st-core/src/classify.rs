//! Message classification against ordered pattern tables.
//!
//! A message is lower-cased, checked against the suppression substrings, and
//! then tested against every start rule and every end rule. Suppression beats
//! everything; a message matching both polarities resolves to `Start`.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::record::{ClassifiedEvent, EventKind, RawRecord};
use crate::timestamp::parse_instant;

/// A pattern that failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// One tagged rule in a [`PatternTable`].
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub kind: EventKind,
    pub pattern: Regex,
}

/// An ordered list of tagged patterns.
#[derive(Debug, Clone)]
pub struct PatternTable {
    rules: Vec<PatternRule>,
}

impl PatternTable {
    /// Compiles `rules` in order.
    pub fn new(rules: &[(EventKind, &str)]) -> Result<Self, PatternError> {
        let rules = rules
            .iter()
            .map(|&(kind, pattern)| {
                Regex::new(pattern)
                    .map(|pattern| PatternRule { kind, pattern })
                    .map_err(|source| PatternError {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Returns the first rule of `kind` that matches `message`.
    pub fn first_match(&self, kind: EventKind, message: &str) -> Option<&PatternRule> {
        self.rules
            .iter()
            .filter(|rule| rule.kind == kind)
            .find(|rule| rule.pattern.is_match(message))
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Matched rules of exactly one kind.
    Matched(EventKind),
    /// Matched rules of both kinds; carries the kind that won.
    Ambiguous(EventKind),
    /// Contained a suppression substring.
    Suppressed,
    /// Matched nothing.
    Unclassified,
}

impl Classification {
    /// The kind this message contributes to the event stream, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<EventKind> {
        match self {
            Self::Matched(kind) | Self::Ambiguous(kind) => Some(*kind),
            Self::Suppressed | Self::Unclassified => None,
        }
    }
}

/// A pattern table plus the substrings that veto it.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: PatternTable,
    suppressions: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(table: PatternTable, suppressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suppressions = suppressions
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            table,
            suppressions,
        }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn suppressions(&self) -> &[String] {
        &self.suppressions
    }

    /// Classifies a raw message. Matching is case-insensitive.
    pub fn classify(&self, message: &str) -> Classification {
        let message = message.to_lowercase();

        if self.suppressions.iter().any(|s| message.contains(s.as_str())) {
            return Classification::Suppressed;
        }

        let is_start = self.table.first_match(EventKind::Start, &message).is_some();
        let is_end = self.table.first_match(EventKind::End, &message).is_some();

        match (is_start, is_end) {
            (true, true) => Classification::Ambiguous(EventKind::Start),
            (true, false) => Classification::Matched(EventKind::Start),
            (false, true) => Classification::Matched(EventKind::End),
            (false, false) => Classification::Unclassified,
        }
    }
}

/// Counters for one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub total: usize,
    pub unparseable: usize,
    pub suppressed: usize,
    pub unclassified: usize,
    pub ambiguous: usize,
    pub starts: usize,
    pub ends: usize,
}

/// Turns raw records into classified events.
///
/// Records with unparseable timestamps are skipped before classification.
/// Suppressed and unclassified records are dropped. Input order is kept.
pub fn classify_records(
    records: &[RawRecord],
    classifier: &Classifier,
) -> (Vec<ClassifiedEvent>, ClassificationStats) {
    let mut stats = ClassificationStats {
        total: records.len(),
        ..ClassificationStats::default()
    };
    let mut events = Vec::new();

    for record in records {
        let instant = match parse_instant(&record.timestamp) {
            Ok(instant) => instant,
            Err(e) => {
                tracing::debug!(error = %e, "skipping record with unparseable timestamp");
                stats.unparseable += 1;
                continue;
            }
        };

        let classification = classifier.classify(&record.message);
        match classification {
            Classification::Suppressed => stats.suppressed += 1,
            Classification::Unclassified => stats.unclassified += 1,
            Classification::Ambiguous(kind) => {
                tracing::trace!(
                    message = %record.message,
                    resolved = %kind,
                    "message matched both start and end patterns"
                );
                stats.ambiguous += 1;
            }
            Classification::Matched(_) => {}
        }

        let Some(kind) = classification.kind() else {
            continue;
        };
        match kind {
            EventKind::Start => stats.starts += 1,
            EventKind::End => stats.ends += 1,
        }

        events.push(ClassifiedEvent {
            instant,
            kind,
            raw_message: record.message.clone(),
            process: record.process.clone(),
            subsystem: record.subsystem.clone(),
        });
    }

    tracing::debug!(
        total = stats.total,
        classified = events.len(),
        unparseable = stats.unparseable,
        suppressed = stats.suppressed,
        ambiguous = stats.ambiguous,
        "classified records"
    );

    (events, stats)
}
