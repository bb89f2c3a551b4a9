//! Timestamp normalization for unified log output.
//!
//! The log tool prints instants as `2025-07-23 16:27:06.105357+0900`. The
//! compact `+HHMM` offset is not accepted by `%:z`, so it is rewritten to
//! `+HH:MM` before parsing.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// An offset-aware point in time, read in the offset it was logged with.
pub type Instant = DateTime<FixedOffset>;

/// Format of a normalized log timestamp.
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Length of a compact offset suffix (`+HHMM`).
const COMPACT_OFFSET_LEN: usize = 5;

/// Failure to turn a record's timestamp into an [`Instant`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampParseError {
    #[error("empty timestamp")]
    Empty,
    #[error("invalid timestamp {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Rewrites a trailing `±HHMM` offset to `±HH:MM`.
///
/// Strings without a compact offset (including already-normalized ones) are
/// returned unchanged, so applying this twice is the same as applying it once.
pub fn normalize_offset(raw: &str) -> Cow<'_, str> {
    let Some(split) = raw.len().checked_sub(COMPACT_OFFSET_LEN) else {
        return Cow::Borrowed(raw);
    };
    if split == 0 || !raw.is_char_boundary(split) {
        return Cow::Borrowed(raw);
    }

    let (head, offset) = raw.split_at(split);
    let bytes = offset.as_bytes();
    let is_compact = matches!(bytes[0], b'+' | b'-') && bytes[1..].iter().all(u8::is_ascii_digit);
    let follows_time = head.as_bytes().last().is_some_and(u8::is_ascii_digit);

    if is_compact && follows_time {
        Cow::Owned(format!("{head}{}:{}", &offset[..3], &offset[3..]))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Parses a log timestamp into an offset-aware instant.
///
/// Accepts the log tool's space-separated form (with either offset style) and
/// RFC 3339. Timestamps without an offset are rejected.
pub fn parse_instant(raw: &str) -> Result<Instant, TimestampParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimestampParseError::Empty);
    }

    let normalized = normalize_offset(trimmed);
    DateTime::parse_from_str(&normalized, LOG_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(&normalized))
        .map_err(|source| TimestampParseError::Invalid {
            value: raw.to_string(),
            source,
        })
}
