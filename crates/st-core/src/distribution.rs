//! Session distributions for charts.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use crate::pairing::Session;

/// Session starts bucketed by hour of day, read in each start's own offset.
pub fn starts_by_hour(sessions: &[Session]) -> [usize; 24] {
    let mut buckets = [0usize; 24];
    for session in sessions {
        buckets[session.start.hour() as usize] += 1;
    }
    buckets
}

/// Session starts bucketed by weekday, Monday first.
pub fn starts_by_weekday(sessions: &[Session]) -> [usize; 7] {
    let mut buckets = [0usize; 7];
    for session in sessions {
        buckets[session.start.weekday().num_days_from_monday() as usize] += 1;
    }
    buckets
}

/// Total session hours per logical day, sorted by day.
pub fn usage_by_day(sessions: &[Session]) -> Vec<(NaiveDate, f64)> {
    let mut usage: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for session in sessions {
        *usage.entry(session.day).or_insert(0.0) += session.duration_minutes / 60.0;
    }
    usage.into_iter().collect()
}

/// One bar of a duration histogram, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of session durations.
///
/// Bins span `[min, max]`; every bin is half-open except the last, which
/// also holds `max`. When all durations are equal the range is widened by
/// half a minute on each side.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn duration_histogram(sessions: &[Session], bins: usize) -> Vec<HistogramBin> {
    if sessions.is_empty() || bins == 0 {
        return Vec::new();
    }

    let durations = sessions.iter().map(|s| s.duration_minutes);
    let (mut lo, mut hi) = durations
        .clone()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for d in durations {
        let index = (((d - lo) / width).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    histogram
}
