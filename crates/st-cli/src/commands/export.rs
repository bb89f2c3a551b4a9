//! Persistence of analysis results.
//!
//! Daily rows go to a CSV whose column names carry the profile's labels
//! (`first_start_time`, `first_wake_time`, ...). Statistics go to a pretty
//! JSON file next to it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use st_core::{
    Analysis, ClassificationStats, DailyRow, EventKind, EventKindPair, Instant, PairingStats,
    Profile, Summary,
};

/// CSV header line for a label pair, without trailing newline.
pub fn csv_header(kinds: EventKindPair) -> String {
    let s = kinds.label(EventKind::Start);
    let e = kinds.label(EventKind::End);
    format!(
        "date,first_{s}_time,last_{e}_time,first_{s}_datetime,last_{e}_datetime,\
         {s}_count,{e}_count,session_count,avg_duration_min,total_duration_min"
    )
}

fn time_cell(instant: Option<&Instant>) -> String {
    instant.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()
}

fn datetime_cell(instant: Option<&Instant>) -> String {
    instant.map(DateTime::to_rfc3339).unwrap_or_default()
}

/// One CSV line for a daily row, without trailing newline.
pub fn csv_row(row: &DailyRow) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{:.2},{:.2}",
        row.day,
        time_cell(row.first_start.as_ref()),
        time_cell(row.last_end.as_ref()),
        datetime_cell(row.first_start.as_ref()),
        datetime_cell(row.last_end.as_ref()),
        row.start_count,
        row.end_count,
        row.session_count,
        row.avg_duration_minutes,
        row.total_duration_minutes,
    )
}

/// Writes the daily CSV.
pub fn write_daily_csv<W: Write>(mut writer: W, analysis: &Analysis) -> Result<()> {
    writeln!(writer, "{}", csv_header(analysis.kinds)).context("failed to write CSV header")?;
    for row in &analysis.daily {
        writeln!(writer, "{}", csv_row(row)).context("failed to write CSV row")?;
    }
    writer.flush().context("failed to flush CSV")?;
    Ok(())
}

/// Contents of the statistics JSON file.
#[derive(Debug, Serialize)]
pub struct StatsFile<'a> {
    pub profile: Profile,
    pub generated_at: String,
    pub cutoff_hour: u32,
    pub summary: &'a Summary,
    pub classification: &'a ClassificationStats,
    pub pairing: &'a PairingStats,
}

impl<'a> StatsFile<'a> {
    pub fn new(
        analysis: &'a Analysis,
        profile: Profile,
        cutoff_hour: u32,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            profile,
            generated_at: generated_at.to_rfc3339(),
            cutoff_hour,
            summary: &analysis.summary,
            classification: &analysis.classification,
            pairing: &analysis.pairing,
        }
    }
}

/// Writes the statistics as pretty JSON.
pub fn write_stats_json<W: Write>(mut writer: W, stats: &StatsFile<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, stats).context("failed to serialize statistics")?;
    writeln!(writer).context("failed to write statistics")?;
    writer.flush().context("failed to flush statistics")?;
    Ok(())
}

/// Default statistics path for a CSV: `<stem>_stats.json` in the same directory.
pub fn stats_path_for(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map_or_else(|| "analysis".into(), |s| s.to_string_lossy());
    csv_path.with_file_name(format!("{stem}_stats.json"))
}

/// Creates `path` for writing, along with any missing parent directories.
fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Saves the daily CSV and the statistics JSON.
pub fn save(analysis: &Analysis, csv_path: &Path, stats_path: &Path, stats: &StatsFile<'_>) -> Result<()> {
    write_daily_csv(create_file(csv_path)?, analysis)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;
    tracing::debug!(path = %csv_path.display(), rows = analysis.daily.len(), "wrote daily CSV");

    write_stats_json(create_file(stats_path)?, stats)
        .with_context(|| format!("failed to write {}", stats_path.display()))?;
    tracing::debug!(path = %stats_path.display(), "wrote statistics");
    Ok(())
}
