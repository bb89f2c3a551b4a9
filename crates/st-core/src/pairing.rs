//! Session pairing.
//!
//! Events are re-sorted by instant and walked once with a single open-start
//! slot:
//!
//! - `Start` with nothing open opens a session; a second `Start` is dropped.
//! - `End` with a session open closes it; an `End` with nothing open is dropped.
//! - A start still open after the last event produces no session.

use chrono::NaiveDate;
use serde::Serialize;

use crate::day::DayBoundary;
use crate::record::{ClassifiedEvent, EventKind};
use crate::timestamp::Instant;

/// A closed start/end pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub start: Instant,
    pub end: Instant,
    pub duration_minutes: f64,
    /// Logical day of the end instant.
    pub day: NaiveDate,
}

/// Events the pairer could not use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairingStats {
    /// Starts that arrived while another start was open.
    pub discarded_starts: usize,
    /// Ends that arrived with nothing open.
    pub discarded_ends: usize,
    /// The start still open when input ran out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unterminated_start: Option<Instant>,
}

/// Sessions in closing order plus what was dropped along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    pub sessions: Vec<Session>,
    pub stats: PairingStats,
}

/// Minutes between two instants, keeping sub-minute precision.
#[allow(clippy::cast_precision_loss)]
pub fn minutes_between(start: &Instant, end: &Instant) -> f64 {
    let delta = *end - *start;
    delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 60_000.0,
        |us| us as f64 / 60_000_000.0,
    )
}

/// Pairs start and end events into sessions.
///
/// Input order is not trusted: events are stably sorted by instant first, so
/// events sharing an instant keep their relative order.
pub fn pair_sessions(events: &[ClassifiedEvent], boundary: &DayBoundary) -> Pairing {
    let mut ordered: Vec<&ClassifiedEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.instant);

    let mut sessions = Vec::new();
    let mut stats = PairingStats::default();
    let mut open: Option<Instant> = None;

    for event in ordered {
        match (event.kind, open) {
            (EventKind::Start, None) => open = Some(event.instant),
            (EventKind::Start, Some(_)) => {
                tracing::trace!(at = %event.instant, "discarding start while a session is open");
                stats.discarded_starts += 1;
            }
            (EventKind::End, Some(start)) => {
                sessions.push(Session {
                    start,
                    end: event.instant,
                    duration_minutes: minutes_between(&start, &event.instant),
                    day: boundary.logical_day(&event.instant),
                });
                open = None;
            }
            (EventKind::End, None) => {
                tracing::trace!(at = %event.instant, "discarding end with no open session");
                stats.discarded_ends += 1;
            }
        }
    }

    if let Some(start) = open {
        tracing::debug!(at = %start, "dropping unterminated session");
    }
    stats.unterminated_start = open;

    tracing::debug!(
        sessions = sessions.len(),
        discarded_starts = stats.discarded_starts,
        discarded_ends = stats.discarded_ends,
        "paired sessions"
    );

    Pairing { sessions, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn event(kind: EventKind, ts: &str) -> ClassifiedEvent {
        ClassifiedEvent {
            instant: DateTime::parse_from_rfc3339(ts).unwrap(),
            kind,
            raw_message: String::new(),
            process: "loginwindow".to_string(),
            subsystem: String::new(),
        }
    }

    fn start(hm: &str) -> ClassifiedEvent {
        event(EventKind::Start, &format!("2025-07-23T{hm}:00+09:00"))
    }

    fn end(hm: &str) -> ClassifiedEvent {
        event(EventKind::End, &format!("2025-07-23T{hm}:00+09:00"))
    }

    fn durations(pairing: &Pairing) -> Vec<f64> {
        pairing.sessions.iter().map(|s| s.duration_minutes).collect()
    }

    #[test]
    fn two_clean_sessions() {
        let events = [start("10:00"), end("10:30"), start("11:00"), end("11:45")];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(durations(&pairing), vec![30.0, 45.0]);
        assert_eq!(pairing.stats, PairingStats::default());
    }

    // The open start is kept; the later one is the start that gets dropped.
    #[test]
    fn second_start_while_open_is_discarded() {
        let events = [start("09:00"), start("09:05"), end("09:10")];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(pairing.sessions.len(), 1);
        assert_eq!(pairing.sessions[0].start, events[0].instant);
        assert_eq!(pairing.sessions[0].end, events[2].instant);
        assert_eq!(durations(&pairing), vec![10.0]);
        assert_eq!(pairing.stats.discarded_starts, 1);
    }

    #[test]
    fn leading_end_and_trailing_start_yield_nothing() {
        let events = [end("08:00"), start("23:50")];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert!(pairing.sessions.is_empty());
        assert_eq!(pairing.stats.discarded_ends, 1);
        assert_eq!(pairing.stats.unterminated_start, Some(events[1].instant));
    }

    #[test]
    fn input_is_sorted_before_pairing() {
        let events = [end("11:45"), start("11:00"), end("10:30"), start("10:00")];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(durations(&pairing), vec![30.0, 45.0]);
    }

    #[test]
    fn session_day_comes_from_end_instant() {
        let events = [
            event(EventKind::Start, "2025-07-23T04:30:00+09:00"),
            event(EventKind::End, "2025-07-23T05:15:00+09:00"),
        ];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(
            pairing.sessions[0].day,
            NaiveDate::from_ymd_opt(2025, 7, 23).unwrap()
        );
    }

    #[test]
    fn overnight_session_before_cutoff_belongs_to_previous_day() {
        let events = [
            event(EventKind::Start, "2025-07-22T23:00:00+09:00"),
            event(EventKind::End, "2025-07-23T01:30:00+09:00"),
        ];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(durations(&pairing), vec![150.0]);
        assert_eq!(
            pairing.sessions[0].day,
            NaiveDate::from_ymd_opt(2025, 7, 22).unwrap()
        );
    }

    #[test]
    fn fractional_minutes_are_kept() {
        let events = [
            event(EventKind::Start, "2025-07-23T10:00:00+09:00"),
            event(EventKind::End, "2025-07-23T10:00:45.5+09:00"),
        ];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        let minutes = pairing.sessions[0].duration_minutes;
        assert!((minutes - 45.5 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn same_instant_start_end_is_zero_length() {
        let events = [start("10:00"), end("10:00")];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(durations(&pairing), vec![0.0]);
    }

    #[test]
    fn mixed_offsets_are_compared_as_instants() {
        // 10:00+09:00 is 01:00Z and 03:20+02:00 is 01:20Z.
        let events = [
            event(EventKind::Start, "2025-07-23T10:00:00+09:00"),
            event(EventKind::End, "2025-07-23T03:20:00+02:00"),
        ];
        let pairing = pair_sessions(&events, &DayBoundary::default());

        assert_eq!(durations(&pairing), vec![20.0]);
    }

    #[test]
    fn empty_input_yields_no_sessions() {
        let pairing = pair_sessions(&[], &DayBoundary::default());
        assert_eq!(pairing, Pairing::default());
    }
}
