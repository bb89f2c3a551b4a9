//! Report command for usage charts.
//!
//! This module implements `st report`: daily usage, session starts by hour
//! and weekday, and a session length histogram, drawn as text bars.

use std::fmt::Write;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use st_core::distribution::{
    HistogramBin, duration_histogram, starts_by_hour, starts_by_weekday, usage_by_day,
};
use st_core::{Analysis, Profile, Session};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ========== Duration Formatting ==========

/// Formats minutes as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative or non-finite durations are shown as 0m.
#[allow(clippy::cast_possible_truncation)]
pub fn format_minutes(minutes: f64) -> String {
    if !minutes.is_finite() || minutes < 0.0 {
        return "0m".to_string();
    }
    let total_minutes = minutes.floor() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Nonzero values under 5% of max get a single block.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value / max;
    let filled = if ratio < 0.05 && value > 0.0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Chart data derived from a session list.
#[derive(Debug)]
pub struct ReportData {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub usage: Vec<(NaiveDate, f64)>,
    pub hours: [usize; 24],
    pub weekdays: [usize; 7],
    pub histogram: Vec<HistogramBin>,
}

impl ReportData {
    pub fn from_sessions(sessions: &[Session], bins: usize) -> Self {
        let usage = usage_by_day(sessions);
        Self {
            first_day: usage.first().map(|(d, _)| *d),
            last_day: usage.last().map(|(d, _)| *d),
            hours: starts_by_hour(sessions),
            weekdays: starts_by_weekday(sessions),
            histogram: duration_histogram(sessions, bins),
            usage,
        }
    }
}

fn section(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

#[allow(clippy::cast_precision_loss)]
fn count_bar(count: usize, max: usize) -> String {
    progress_bar(count as f64, max as f64)
}

/// Formats the human-readable report.
pub fn format_report(data: &ReportData, profile: Profile) -> String {
    let mut output = String::new();

    match (data.first_day, data.last_day) {
        (Some(first), Some(last)) => {
            writeln!(output, "USAGE REPORT: {profile} ({first} to {last})").unwrap();
        }
        _ => {
            writeln!(output, "USAGE REPORT: {profile}").unwrap();
            writeln!(output).unwrap();
            writeln!(output, "No sessions recorded.").unwrap();
            return output;
        }
    }

    section(&mut output, "DAILY USAGE");
    let max_hours = data.usage.iter().map(|(_, h)| *h).fold(0.0, f64::max);
    for (day, hours) in &data.usage {
        let weekday = WEEKDAYS[day.weekday().num_days_from_monday() as usize];
        let duration = format_minutes(hours * 60.0);
        let bar = progress_bar(*hours, max_hours);
        writeln!(output, "{day}  {weekday}  {duration:>7}  {bar}").unwrap();
    }

    section(&mut output, "SESSION STARTS BY HOUR");
    let max_hour = data.hours.iter().copied().max().unwrap_or(0);
    for (hour, count) in data.hours.iter().enumerate() {
        let bar = count_bar(*count, max_hour);
        writeln!(output, "{hour:02}  {count:>3}  {bar}").unwrap();
    }

    section(&mut output, "SESSION STARTS BY WEEKDAY");
    let max_weekday = data.weekdays.iter().copied().max().unwrap_or(0);
    for (name, count) in WEEKDAYS.iter().zip(data.weekdays) {
        let bar = count_bar(count, max_weekday);
        writeln!(output, "{name}  {count:>3}  {bar}").unwrap();
    }

    section(&mut output, "SESSION LENGTH (minutes)");
    let max_bin = data.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &data.histogram {
        let bar = count_bar(bin.count, max_bin);
        writeln!(
            output,
            "{:>7.1} - {:>7.1}  {:>3}  {bar}",
            bin.lower, bin.upper, bin.count
        )
        .unwrap();
    }

    output
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(analysis: &Analysis, profile: Profile, bins: usize) -> Result<()> {
    let data = ReportData::from_sessions(&analysis.sessions, bins);
    print!("{}", format_report(&data, profile));
    Ok(())
}
