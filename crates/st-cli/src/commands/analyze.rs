//! Analyze command: daily table, summary statistics and saved results.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use st_core::{Analysis, EventKind, Instant, Profile};

use super::export::{self, StatsFile};
use super::report::format_minutes;

/// Output choices for `st analyze`.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub output: PathBuf,
    pub stats: PathBuf,
    pub write: bool,
    pub json: bool,
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn time_or_dash(instant: Option<&Instant>) -> String {
    instant.map_or_else(|| "-".to_string(), |t| t.format("%H:%M:%S").to_string())
}

fn field(output: &mut String, name: &str, value: impl std::fmt::Display) {
    writeln!(output, "{:<19}{value}", format!("{name}:")).unwrap();
}

/// Formats the daily table and summary.
pub fn format_summary(analysis: &Analysis, profile: Profile) -> String {
    let mut output = String::new();
    let s = analysis.kinds.label(EventKind::Start);
    let e = analysis.kinds.label(EventKind::End);
    let summary = &analysis.summary;

    match (summary.first_day, summary.last_day) {
        (Some(first), Some(last)) => {
            writeln!(output, "SCREENTIME: {profile} ({first} to {last})").unwrap();
        }
        _ => writeln!(output, "SCREENTIME: {profile}").unwrap(),
    }

    // DAILY section
    writeln!(output).unwrap();
    writeln!(output, "DAILY").unwrap();
    writeln!(output, "─────").unwrap();
    writeln!(
        output,
        "{:<10}  {:<11}  {:<11}  {:>6}  {:>6}  {:>8}  {:>7}",
        "Date",
        format!("First {s}"),
        format!("Last {e}"),
        format!("{}s", capitalize(s)),
        format!("{}s", capitalize(e)),
        "Sessions",
        "Total"
    )
    .unwrap();
    for row in &analysis.daily {
        writeln!(
            output,
            "{:<10}  {:<11}  {:<11}  {:>6}  {:>6}  {:>8}  {:>7}",
            row.day,
            time_or_dash(row.first_start.as_ref()),
            time_or_dash(row.last_end.as_ref()),
            row.start_count,
            row.end_count,
            row.session_count,
            format_minutes(row.total_duration_minutes)
        )
        .unwrap();
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    field(
        &mut output,
        "Days",
        format!(
            "{} ({} with activity)",
            summary.total_days, summary.days_with_activity
        ),
    );
    field(
        &mut output,
        "Sessions",
        format!(
            "{} ({:.2} per day)",
            summary.total_sessions, summary.avg_sessions_per_day
        ),
    );
    field(&mut output, "Average session", format_minutes(summary.avg_session_minutes));
    field(&mut output, "Median session", format_minutes(summary.median_session_minutes));
    field(&mut output, "Shortest session", format_minutes(summary.min_session_minutes));
    field(&mut output, "Longest session", format_minutes(summary.max_session_minutes));
    field(&mut output, "Std deviation", format_minutes(summary.stddev_session_minutes));
    field(&mut output, "Total usage", format!("{:.2}h", summary.total_usage_hours));
    field(
        &mut output,
        &format!("Peak {s} hour"),
        format!("{:02}:00", summary.peak_start_hour),
    );

    // RECORDS section
    let classification = &analysis.classification;
    let pairing = &analysis.pairing;
    writeln!(output).unwrap();
    writeln!(output, "RECORDS").unwrap();
    writeln!(output, "───────").unwrap();
    field(&mut output, "Read", classification.total);
    field(&mut output, &format!("{} events", capitalize(s)), classification.starts);
    field(&mut output, &format!("{} events", capitalize(e)), classification.ends);
    field(&mut output, "Ambiguous", classification.ambiguous);
    field(&mut output, "Suppressed", classification.suppressed);
    field(&mut output, "Unclassified", classification.unclassified);
    field(&mut output, "Bad timestamp", classification.unparseable);
    field(&mut output, &format!("Discarded {s}s"), pairing.discarded_starts);
    field(&mut output, &format!("Discarded {e}s"), pairing.discarded_ends);
    if let Some(open) = pairing.unterminated_start {
        field(&mut output, &format!("Open {s}"), open.to_rfc3339());
    }

    output
}

/// Runs the analyze command.
pub fn run(
    analysis: &Analysis,
    profile: Profile,
    cutoff_hour: u32,
    options: &AnalyzeOptions,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else if analysis.is_empty() {
        println!("No classifiable events found.");
        return Ok(());
    } else {
        print!("{}", format_summary(analysis, profile));
    }

    if options.write && !analysis.is_empty() {
        let stats = StatsFile::new(analysis, profile, cutoff_hour, generated_at);
        export::save(analysis, &options.output, &options.stats, &stats)?;
        if !options.json {
            println!();
            println!("Saved daily rows to {}", options.output.display());
            println!("Saved statistics to {}", options.stats.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use st_core::{Analyzer, DayBoundary, RawRecord, analyze};

    fn analysis(profile: Profile, records: &[RawRecord]) -> Analysis {
        analyze(
            records,
            &Analyzer::for_profile(profile, &[], DayBoundary::default()),
        )
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("wake"), "Wake");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_summary_loginwindow() {
        let records = vec![
            RawRecord::new("2025-07-22 09:00:00.000000+0900", "screenIsLocked = 0"),
            RawRecord::new("2025-07-22 09:30:00.000000+0900", "screenIsLocked = 1"),
            RawRecord::new("2025-07-22 23:00:00.000000+0900", "screenIsLocked = 0"),
            RawRecord::new("2025-07-23 01:15:00.000000+0900", "screenIsLocked = 1"),
            RawRecord::new("2025-07-23 08:00:00.000000+0900", "screenIsLocked = 0"),
        ];
        let output = format_summary(&analysis(Profile::Loginwindow, &records), Profile::Loginwindow);

        assert_snapshot!(output, @r"
        SCREENTIME: loginwindow (2025-07-22 to 2025-07-23)

        DAILY
        ─────
        Date        First start  Last end     Starts    Ends  Sessions    Total
        2025-07-22  09:00:00     01:15:00          2       2         2   2h 45m
        2025-07-23  08:00:00     -                 1       0         0       0m

        SUMMARY
        ───────
        Days:              2 (2 with activity)
        Sessions:          2 (1.00 per day)
        Average session:   1h 22m
        Median session:    1h 22m
        Shortest session:  30m
        Longest session:   2h 15m
        Std deviation:     52m
        Total usage:       2.75h
        Peak start hour:   09:00

        RECORDS
        ───────
        Read:              5
        Start events:      3
        End events:        2
        Ambiguous:         3
        Suppressed:        0
        Unclassified:      0
        Bad timestamp:     0
        Discarded starts:  0
        Discarded ends:    0
        Open start:        2025-07-23T08:00:00+09:00
        ");
    }

    #[test]
    fn test_summary_powerchime_labels() {
        let records = vec![
            RawRecord::new("2025-07-22 22:00:00.000000+0900", "did wake"),
            RawRecord::new("2025-07-23 01:30:00.000000+0900", "did sleep"),
            RawRecord::new("2025-07-23 02:00:00.000000+0900", "did sleep"),
        ];
        let output = format_summary(&analysis(Profile::PowerChime, &records), Profile::PowerChime);

        assert_snapshot!(output, @r"
        SCREENTIME: powerchime (2025-07-22 to 2025-07-22)

        DAILY
        ─────
        Date        First wake   Last sleep    Wakes  Sleeps  Sessions    Total
        2025-07-22  22:00:00     02:00:00          1       2         1   3h 30m

        SUMMARY
        ───────
        Days:              1 (1 with activity)
        Sessions:          1 (1.00 per day)
        Average session:   3h 30m
        Median session:    3h 30m
        Shortest session:  3h 30m
        Longest session:   3h 30m
        Std deviation:     0m
        Total usage:       3.50h
        Peak wake hour:    22:00

        RECORDS
        ───────
        Read:              3
        Wake events:       1
        Sleep events:      2
        Ambiguous:         0
        Suppressed:        0
        Unclassified:      0
        Bad timestamp:     0
        Discarded wakes:   0
        Discarded sleeps:  1
        ");
    }

    #[test]
    fn test_run_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            RawRecord::new("2025-07-22 22:00:00.000000+0900", "did wake"),
            RawRecord::new("2025-07-23 01:30:00.000000+0900", "did sleep"),
        ];
        let options = AnalyzeOptions {
            output: dir.path().join("powerchime_analysis.csv"),
            stats: dir.path().join("powerchime_analysis_stats.json"),
            write: true,
            json: false,
        };

        run(
            &analysis(Profile::PowerChime, &records),
            Profile::PowerChime,
            5,
            &options,
            Utc::now(),
        )
        .unwrap();

        assert!(options.output.exists());
        assert!(options.stats.exists());
    }

    #[test]
    fn test_run_empty_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = AnalyzeOptions {
            output: dir.path().join("out.csv"),
            stats: dir.path().join("out_stats.json"),
            write: true,
            json: false,
        };

        run(
            &analysis(Profile::Loginwindow, &[]),
            Profile::Loginwindow,
            5,
            &options,
            Utc::now(),
        )
        .unwrap();

        assert!(!options.output.exists());
    }
}
