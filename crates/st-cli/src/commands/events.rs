//! Events command for inspecting classification.
//!
//! This module outputs classified events as JSONL for debugging pattern tables.

use std::io::{BufWriter, Write, stdout};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use st_core::{Analysis, DayBoundary, Instant};

/// One JSONL line: a classified event with its profile label and logical day.
#[derive(Debug, Serialize)]
pub struct EventLine<'a> {
    pub timestamp: Instant,
    pub day: NaiveDate,
    pub kind: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<&'a str>,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Builds the lines to print, in input order, up to `limit`.
pub fn event_lines<'a>(
    analysis: &'a Analysis,
    boundary: &DayBoundary,
    limit: Option<usize>,
) -> Vec<EventLine<'a>> {
    analysis
        .events
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|event| EventLine {
            timestamp: event.instant,
            day: boundary.logical_day(&event.instant),
            kind: analysis.kinds.label(event.kind),
            message: &event.raw_message,
            process: non_empty(&event.process),
            subsystem: non_empty(&event.subsystem),
        })
        .collect()
}

/// Runs the events command, outputting events as JSONL to stdout.
pub fn run(analysis: &Analysis, boundary: &DayBoundary, limit: Option<usize>) -> Result<()> {
    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for line in event_lines(analysis, boundary, limit) {
        serde_json::to_writer(&mut writer, &line).context("failed to serialize event")?;
        // Stop quietly on a closed pipe (e.g. `| head`)
        if writeln!(writer).is_err() {
            break;
        }
    }
    // Flush errors are a closed pipe too.
    let _ = writer.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::{Analyzer, Profile, RawRecord, analyze};

    fn powerchime() -> Analysis {
        let records = vec![
            RawRecord::new("2025-07-23 01:00:00.000000+0900", "did wake"),
            RawRecord::new("2025-07-23 02:00:00.000000+0900", "noise"),
            RawRecord::new("2025-07-23 09:00:00.000000+0900", "did sleep"),
        ];
        analyze(
            &records,
            &Analyzer::for_profile(Profile::PowerChime, &[], DayBoundary::default()),
        )
    }

    #[test]
    fn test_event_lines_use_profile_labels() {
        let analysis = powerchime();
        let lines = event_lines(&analysis, &DayBoundary::default(), None);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, "wake");
        assert_eq!(lines[0].day.to_string(), "2025-07-22");
        assert_eq!(lines[1].kind, "sleep");
        assert_eq!(lines[1].day.to_string(), "2025-07-23");
    }

    #[test]
    fn test_event_lines_limit() {
        let analysis = powerchime();
        assert_eq!(event_lines(&analysis, &DayBoundary::default(), Some(1)).len(), 1);
        assert!(event_lines(&analysis, &DayBoundary::default(), Some(0)).is_empty());
    }

    #[test]
    fn test_event_line_json() {
        let analysis = powerchime();
        let lines = event_lines(&analysis, &DayBoundary::default(), Some(1));
        let json = serde_json::to_string(&lines[0]).unwrap();

        assert_eq!(
            json,
            r#"{"timestamp":"2025-07-23T01:00:00+09:00","day":"2025-07-22","kind":"wake","message":"did wake"}"#
        );
    }
}
