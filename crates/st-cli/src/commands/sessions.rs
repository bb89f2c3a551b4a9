//! Sessions command: list paired sessions.

use std::fmt::Write as _;

use anyhow::Result;
use st_core::{Analysis, EventKind, Session};

use super::report::format_minutes;

/// Formats sessions as a table, one line per session.
pub fn format_sessions(analysis: &Analysis) -> String {
    let mut output = String::new();

    if analysis.sessions.is_empty() {
        writeln!(output, "No sessions found.").unwrap();
        return output;
    }

    let s = analysis.kinds.label(EventKind::Start);
    let e = analysis.kinds.label(EventKind::End);
    writeln!(output, "{:<10}  {:<19}  {:<19}  {:>8}", "Day", s, e, "Duration").unwrap();
    for session in &analysis.sessions {
        writeln!(
            output,
            "{:<10}  {:<19}  {:<19}  {:>8}",
            session.day,
            session.start.format("%Y-%m-%d %H:%M:%S").to_string(),
            session.end.format("%Y-%m-%d %H:%M:%S").to_string(),
            format_minutes(session.duration_minutes)
        )
        .unwrap();
    }

    let total: f64 = analysis.sessions.iter().map(|s| s.duration_minutes).sum();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{} sessions, {} total",
        analysis.sessions.len(),
        format_minutes(total)
    )
    .unwrap();
    output
}

/// Serializes sessions as pretty JSON.
pub fn format_sessions_json(sessions: &[Session]) -> Result<String> {
    Ok(serde_json::to_string_pretty(sessions)?)
}

/// Runs the sessions command.
pub fn run(analysis: &Analysis, json: bool) -> Result<()> {
    if json {
        println!("{}", format_sessions_json(&analysis.sessions)?);
    } else {
        print!("{}", format_sessions(analysis));
    }
    Ok(())
}
