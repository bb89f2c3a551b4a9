//! Core engine for screentime.
//!
//! This crate turns system log records into usage sessions:
//! - Timestamp normalization for the log tool's compact offsets
//! - Classification of messages into start/end events via pattern tables
//! - Logical days with a 5 a.m. cutoff
//! - Session pairing and per-day aggregation
//!
//! Nothing here performs I/O; every stage takes the previous stage's output
//! and returns a new collection.

mod aggregate;
mod analysis;
pub mod classify;
pub mod day;
pub mod distribution;
mod pairing;
pub mod profile;
mod record;
pub mod timestamp;

pub use aggregate::{DailyRow, Summary, aggregate_daily, median, peak_start_hour, summarize};
pub use analysis::{Analysis, Analyzer, analyze};
pub use classify::{Classification, ClassificationStats, Classifier, PatternTable};
pub use day::{DEFAULT_CUTOFF_HOUR, DayBoundary};
pub use pairing::{Pairing, PairingStats, Session, minutes_between, pair_sessions};
pub use profile::Profile;
pub use record::{ClassifiedEvent, EventKind, EventKindPair, RawRecord, dedup_records};
pub use timestamp::{Instant, TimestampParseError, normalize_offset, parse_instant};
