//! Acquisition of raw log records.
//!
//! Records come either from a file (or stdin) holding `log show` output, or
//! from running `log show` once per profile predicate. Both the JSON array
//! style and the newline-delimited style are accepted.

use std::io::Read;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use st_core::{DayBoundary, Profile, RawRecord, dedup_records};

/// One entry of `log show --style json` output.
///
/// Only `eventMessage` is required for an entry to become a record; the log
/// tool also emits bookkeeping lines that lack it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    event_message: Option<String>,
    #[serde(default)]
    process: Option<String>,
    #[serde(default)]
    process_image_path: Option<String>,
    #[serde(default)]
    subsystem: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "messageType")]
    level: Option<String>,
}

impl LogEntry {
    fn into_record(self) -> Option<RawRecord> {
        let message = self.event_message?;
        // Real `log show` output names the binary only through its path.
        let process = self.process.unwrap_or_else(|| {
            self.process_image_path
                .as_deref()
                .and_then(|p| Path::new(p).file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Some(RawRecord {
            timestamp: self.timestamp.unwrap_or_default(),
            message,
            process,
            subsystem: self.subsystem.unwrap_or_default(),
            category: self.category,
            level: self.level,
        })
    }
}

/// Parses `log show` output in either JSON array or NDJSON style.
///
/// Entries without a message are dropped. In NDJSON, lines that are not JSON
/// objects are skipped and logged at `debug`.
pub fn parse_log_output(text: &str) -> Result<Vec<RawRecord>> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<LogEntry> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("failed to parse log JSON array")?
    } else {
        trimmed
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(line = index + 1, error = %e, "skipping malformed log line");
                    None
                }
            })
            .collect()
    };

    let total = entries.len();
    let records: Vec<RawRecord> = entries.into_iter().filter_map(LogEntry::into_record).collect();
    tracing::debug!(total, kept = records.len(), "parsed log entries");
    Ok(records)
}

/// Reads records from a file, or from stdin when the path is `-`.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read log records from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    parse_log_output(&text).with_context(|| format!("invalid log records in {}", path.display()))
}

/// Whole hours from `start` to `now`, rounded up and at least one.
///
/// `log show --last` only takes whole units, so rounding up keeps the
/// cutoff-aligned window start inside the query.
pub fn lookback_hours(now: NaiveDateTime, start: NaiveDateTime) -> i64 {
    let minutes = (now - start).num_minutes().max(0);
    ((minutes + 59) / 60).max(1)
}

/// Runs `log show` for a single predicate.
fn run_log_show(predicate: &str, hours: i64) -> Result<Vec<RawRecord>> {
    let last = format!("{hours}h");
    tracing::debug!(predicate, last = %last, "running log show");

    let output = Command::new("log")
        .args(["show", "--predicate", predicate, "--last", last.as_str(), "--style", "json"])
        .output()
        .context("failed to run `log show`")?;

    if !output.status.success() {
        bail!(
            "`log show` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_log_output(&String::from_utf8_lossy(&output.stdout))
}

/// Fetches the records for a profile from the system log.
///
/// The query window covers `days` whole logical days before the current
/// one. A profile with several predicates tolerates individual failures and
/// removes records seen by more than one query.
pub fn fetch_records(profile: Profile, days: u32, boundary: &DayBoundary) -> Result<Vec<RawRecord>> {
    let now = Local::now().naive_local();
    let hours = lookback_hours(now, boundary.window_start(now, days));
    let predicates = profile.predicates();

    let mut records = Vec::new();
    for predicate in predicates {
        match run_log_show(predicate, hours) {
            Ok(batch) => {
                tracing::debug!(predicate, records = batch.len(), "fetched log records");
                records.extend(batch);
            }
            Err(e) if predicates.len() > 1 => {
                tracing::warn!(predicate, error = %e, "log query failed, skipping predicate");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to query log for {profile}"));
            }
        }
    }

    Ok(dedup_records(records))
}

/// Loads records from `input` when given, otherwise from the system log.
pub fn load_records(
    input: Option<&Path>,
    profile: Profile,
    days: u32,
    boundary: &DayBoundary,
) -> Result<Vec<RawRecord>> {
    match input {
        Some(path) => Ok(dedup_records(read_records(path)?)),
        None => fetch_records(profile, days, boundary),
    }
}
