//! Collect command: snapshot raw log records for offline analysis.
//!
//! The saved file is a JSON array in the same shape `log show --style json`
//! produces, so it can be fed back through `--input`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use st_core::{DayBoundary, Profile, RawRecord};

use crate::source;

/// Writes records as a pretty JSON array.
pub fn write_records<W: Write>(mut writer: W, records: &[RawRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records).context("failed to serialize records")?;
    writeln!(writer).context("failed to write records")?;
    writer.flush().context("failed to flush records")?;
    Ok(())
}

/// Saves records to `output`, creating parent directories.
pub fn save_records(output: &Path, records: &[RawRecord]) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    write_records(BufWriter::new(file), records)
        .with_context(|| format!("failed to write {}", output.display()))
}

/// Runs the collect command.
pub fn run(profile: Profile, days: u32, boundary: &DayBoundary, output: &Path) -> Result<()> {
    let records = source::fetch_records(profile, days, boundary)?;
    save_records(output, &records)?;
    println!(
        "Saved {} {profile} records ({days} days) to {}",
        records.len(),
        output.display()
    );
    Ok(())
}
