//! The full pipeline from raw records to daily rows.

use serde::Serialize;

use crate::aggregate::{DailyRow, Summary, aggregate_daily, summarize};
use crate::classify::{ClassificationStats, Classifier, classify_records};
use crate::day::DayBoundary;
use crate::pairing::{PairingStats, Session, pair_sessions};
use crate::profile::Profile;
use crate::record::{ClassifiedEvent, EventKindPair, RawRecord};

/// Everything needed to run one analysis.
#[derive(Debug, Clone)]
pub struct Analyzer {
    pub kinds: EventKindPair,
    pub classifier: Classifier,
    pub boundary: DayBoundary,
}

impl Analyzer {
    /// An analyzer for a built-in profile.
    pub fn for_profile(profile: Profile, extra_suppressions: &[String], boundary: DayBoundary) -> Self {
        Self {
            kinds: profile.kinds(),
            classifier: profile.classifier(extra_suppressions),
            boundary,
        }
    }
}

/// Output of [`analyze`]. Each collection is derived from the one before it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub kinds: EventKindPair,
    pub events: Vec<ClassifiedEvent>,
    pub sessions: Vec<Session>,
    pub daily: Vec<DailyRow>,
    pub summary: Summary,
    pub classification: ClassificationStats,
    pub pairing: PairingStats,
}

impl Analysis {
    /// True when no record survived classification.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Classifies, pairs and aggregates a batch of records.
pub fn analyze(records: &[RawRecord], analyzer: &Analyzer) -> Analysis {
    let (events, classification) = classify_records(records, &analyzer.classifier);
    let pairing = pair_sessions(&events, &analyzer.boundary);
    let daily = aggregate_daily(&events, &pairing.sessions, &analyzer.boundary);
    let summary = summarize(&daily, &pairing.sessions);

    Analysis {
        kinds: analyzer.kinds,
        events,
        sessions: pairing.sessions,
        daily,
        summary,
        classification,
        pairing: pairing.stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(profile: Profile) -> Analyzer {
        Analyzer::for_profile(profile, &[], DayBoundary::default())
    }

    fn record(ts: &str, message: &str) -> RawRecord {
        RawRecord::new(ts, message)
    }

    #[test]
    fn empty_input_is_empty_analysis() {
        let analysis = analyze(&[], &analyzer(Profile::Loginwindow));

        assert!(analysis.is_empty());
        assert!(analysis.sessions.is_empty());
        assert!(analysis.daily.is_empty());
        assert_eq!(analysis.summary.total_days, 0);
    }

    #[test]
    fn loginwindow_day() {
        let records = vec![
            record("2025-07-23 08:58:10.000000+0900", "loginwindow: user login"),
            record("2025-07-23 12:00:00.000000+0900", "screenIsLocked = 1"),
            record("2025-07-23 12:45:00.000000+0900", "screenIsLocked = 0"),
            record("2025-07-23 13:00:00.000000+0900", "Clamshell screenIsLocked = 1"),
            record("2025-07-23 18:45:00.000000+0900", "screenIsLocked = 1"),
            record("not a timestamp", "screenIsLocked = 1"),
            record("2025-07-24 02:00:00.000000+0900", "keychain ready"),
        ];
        let analysis = analyze(&records, &analyzer(Profile::Loginwindow));

        assert_eq!(analysis.events.len(), 4);
        assert_eq!(analysis.sessions.len(), 2);
        assert_eq!(analysis.classification.unparseable, 1);
        assert_eq!(analysis.classification.suppressed, 1);
        assert_eq!(analysis.classification.unclassified, 1);
        assert_eq!(analysis.daily.len(), 1);

        let row = &analysis.daily[0];
        assert_eq!(row.day.to_string(), "2025-07-23");
        assert_eq!(row.start_count, 2);
        assert_eq!(row.end_count, 2);
        assert_eq!(row.session_count, 2);
        assert!((row.total_duration_minutes - (181.0 + 50.0 / 60.0 + 360.0)).abs() < 1e-9);
    }

    #[test]
    fn powerchime_overnight() {
        let records = vec![
            record("2025-07-22 22:00:00.000000+0900", "did wake"),
            record("2025-07-23 01:30:00.000000+0900", "did sleep"),
            record("2025-07-23 07:00:00.000000+0900", "did wake"),
        ];
        let analysis = analyze(&records, &analyzer(Profile::PowerChime));

        assert_eq!(analysis.kinds, EventKindPair::WAKE_SLEEP);
        assert_eq!(analysis.sessions.len(), 1);
        assert_eq!(analysis.sessions[0].day.to_string(), "2025-07-22");
        assert!(analysis.pairing.unterminated_start.is_some());
        assert_eq!(
            analysis.daily.iter().map(|r| r.day.to_string()).collect::<Vec<_>>(),
            ["2025-07-22", "2025-07-23"]
        );
    }

    #[test]
    fn summary_serializes() {
        let records = vec![
            record("2025-07-23 10:00:00.000000+0900", "did wake"),
            record("2025-07-23 10:30:00.000000+0900", "did sleep"),
        ];
        let analysis = analyze(&records, &analyzer(Profile::PowerChime));
        let json = serde_json::to_value(&analysis.summary).unwrap();

        assert_eq!(json["total_sessions"], 1);
        assert_eq!(json["peak_start_hour"], 10);
        assert_eq!(json["first_day"], "2025-07-23");
    }
}
