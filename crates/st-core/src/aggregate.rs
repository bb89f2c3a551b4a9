//! Per-day rows and global session statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::day::DayBoundary;
use crate::distribution::starts_by_hour;
use crate::pairing::Session;
use crate::record::{ClassifiedEvent, EventKind};
use crate::timestamp::Instant;

/// Aggregated activity for one logical day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub day: NaiveDate,
    pub first_start: Option<Instant>,
    pub last_end: Option<Instant>,
    pub start_count: usize,
    pub end_count: usize,
    pub session_count: usize,
    pub total_duration_minutes: f64,
    /// Mean session length, `0.0` when the day closed no session.
    pub avg_duration_minutes: f64,
}

impl DailyRow {
    const fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            first_start: None,
            last_end: None,
            start_count: 0,
            end_count: 0,
            session_count: 0,
            total_duration_minutes: 0.0,
            avg_duration_minutes: 0.0,
        }
    }
}

/// Folds events and sessions into one row per observed logical day.
///
/// Rows are sorted by day. Days without events are not synthesized.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_daily(
    events: &[ClassifiedEvent],
    sessions: &[Session],
    boundary: &DayBoundary,
) -> Vec<DailyRow> {
    let mut rows: BTreeMap<NaiveDate, DailyRow> = BTreeMap::new();

    for event in events {
        let day = boundary.logical_day(&event.instant);
        let row = rows.entry(day).or_insert_with(|| DailyRow::empty(day));
        match event.kind {
            EventKind::Start => {
                row.start_count += 1;
                if row.first_start.is_none_or(|t| event.instant < t) {
                    row.first_start = Some(event.instant);
                }
            }
            EventKind::End => {
                row.end_count += 1;
                if row.last_end.is_none_or(|t| event.instant > t) {
                    row.last_end = Some(event.instant);
                }
            }
        }
    }

    for session in sessions {
        let row = rows
            .entry(session.day)
            .or_insert_with(|| DailyRow::empty(session.day));
        row.session_count += 1;
        row.total_duration_minutes += session.duration_minutes;
    }

    rows.into_values()
        .map(|mut row| {
            if row.session_count > 0 {
                row.avg_duration_minutes = row.total_duration_minutes / row.session_count as f64;
            }
            row
        })
        .collect()
}

/// Statistics over the whole session set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub total_days: usize,
    pub days_with_activity: usize,
    pub total_sessions: usize,
    pub avg_sessions_per_day: f64,
    pub avg_session_minutes: f64,
    pub median_session_minutes: f64,
    pub min_session_minutes: f64,
    pub max_session_minutes: f64,
    pub stddev_session_minutes: f64,
    pub total_usage_hours: f64,
    /// Hour of day (start instant) with the most session starts.
    pub peak_start_hour: u32,
}

/// Computes global statistics. All figures are `0` when there are no sessions.
#[allow(clippy::cast_precision_loss)]
pub fn summarize(daily: &[DailyRow], sessions: &[Session]) -> Summary {
    let durations: Vec<f64> = sessions.iter().map(|s| s.duration_minutes).collect();
    let total: f64 = durations.iter().sum();
    let mean = mean(&durations);

    Summary {
        first_day: daily.iter().map(|r| r.day).min(),
        last_day: daily.iter().map(|r| r.day).max(),
        total_days: daily.len(),
        days_with_activity: daily.iter().filter(|r| r.start_count > 0).count(),
        total_sessions: sessions.len(),
        avg_sessions_per_day: if daily.is_empty() {
            0.0
        } else {
            sessions.len() as f64 / daily.len() as f64
        },
        avg_session_minutes: mean,
        median_session_minutes: median(&durations),
        min_session_minutes: durations.iter().copied().reduce(f64::min).unwrap_or(0.0),
        max_session_minutes: durations.iter().copied().reduce(f64::max).unwrap_or(0.0),
        stddev_session_minutes: population_stddev(&durations, mean),
        total_usage_hours: total / 60.0,
        peak_start_hour: peak_start_hour(sessions),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value, or the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[allow(clippy::cast_precision_loss)]
fn population_stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Busiest start hour; ties go to the earliest hour, and `0` when empty.
pub fn peak_start_hour(sessions: &[Session]) -> u32 {
    let buckets = starts_by_hour(sessions);
    let mut peak = 0;
    for (hour, &count) in buckets.iter().enumerate() {
        if count > buckets[peak] {
            peak = hour;
        }
    }
    u32::try_from(peak).unwrap_or(0)
}
