//! Logical days with a non-midnight cutoff.
//!
//! Activity before the cutoff hour belongs to the previous day, so a late
//! night session is reported on the evening it started rather than split.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use thiserror::Error;

/// Default hour at which a new logical day begins.
pub const DEFAULT_CUTOFF_HOUR: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("day cutoff hour must be between 0 and 23, got {0}")]
pub struct DayBoundaryError(pub u32);

/// Maps instants to logical days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    cutoff_hour: u32,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self {
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
        }
    }
}

impl DayBoundary {
    pub const fn new(cutoff_hour: u32) -> Result<Self, DayBoundaryError> {
        if cutoff_hour > 23 {
            return Err(DayBoundaryError(cutoff_hour));
        }
        Ok(Self { cutoff_hour })
    }

    pub const fn cutoff_hour(&self) -> u32 {
        self.cutoff_hour
    }

    /// The logical day of `instant`, read in the instant's own offset.
    pub fn logical_day<Tz: TimeZone>(&self, instant: &chrono::DateTime<Tz>) -> NaiveDate {
        self.logical_day_naive(instant.naive_local())
    }

    /// The logical day of a wall-clock time.
    pub fn logical_day_naive(&self, local: NaiveDateTime) -> NaiveDate {
        let date = local.date();
        if local.hour() < self.cutoff_hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    /// Start of a `days`-long window ending at `now`, aligned to the cutoff.
    ///
    /// The window opens at the cutoff of the logical day `now` falls in, then
    /// steps back `days` whole days.
    pub fn window_start(&self, now: NaiveDateTime, days: u32) -> NaiveDateTime {
        let cutoff = NaiveTime::from_hms_opt(self.cutoff_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let base = self.logical_day_naive(now).and_time(cutoff);
        base.checked_sub_days(Days::new(u64::from(days))).unwrap_or(base)
    }
}
