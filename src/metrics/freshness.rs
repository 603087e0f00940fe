//! Freshness: how recently the record was scraped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::record::{FieldValue, Record};
use crate::rules::CategoryRules;

use super::{Issue, IssueCode, MetricContext, MetricOutcome};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse the timestamp shapes scrapers emit.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (taken as UTC), bare
/// `YYYY-MM-DD` dates and numeric Unix seconds.
pub fn parse_timestamp(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Number(secs) if secs.is_finite() => {
            Utc.timestamp_opt(*secs as i64, 0).single()
        }
        FieldValue::Text(raw) => {
            let s = raw.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for fmt in NAIVE_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(Utc.from_utc_datetime(&naive));
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        _ => None,
    }
}

/// Score a timestamp's age: 1.0 inside the fresh window, the floor past the
/// staleness horizon, linear in between.
fn decay(age_secs: f64, ctx: &MetricContext) -> f64 {
    let window = ctx.tuning.fresh_window_hours as f64 * 3600.0;
    let horizon = ctx.tuning.stale_after_days as f64 * 86_400.0;
    let floor = ctx.tuning.freshness_floor;

    if age_secs <= window {
        1.0
    } else if age_secs >= horizon {
        floor
    } else {
        let progress = (age_secs - window) / (horizon - window);
        1.0 - (1.0 - floor) * progress
    }
}

/// Score freshness from the first timestamp field the record carries.
///
/// A record without any timestamp gets the neutral score, not a penalty.
pub fn score(record: &Record, rules: &CategoryRules, ctx: &MetricContext) -> MetricOutcome {
    let found = rules
        .timestamp_fields
        .iter()
        .find_map(|f| record.non_blank(f).map(|v| (f.as_str(), v)));

    let Some((field, value)) = found else {
        return MetricOutcome::new(ctx.tuning.freshness_neutral, Vec::new());
    };

    let Some(ts) = parse_timestamp(value) else {
        return MetricOutcome::new(
            ctx.tuning.freshness_floor,
            vec![Issue::field(
                IssueCode::InvalidTimestamp,
                field,
                "timestamp could not be parsed",
            )],
        );
    };

    let age_secs = (ctx.now - ts).num_seconds() as f64;
    let score = decay(age_secs, ctx);

    let mut issues = Vec::new();
    if score < ctx.tuning.issue_threshold {
        issues.push(Issue::record(
            IssueCode::StaleData,
            format!("data is {} days old", (age_secs / 86_400.0).floor()),
        ));
    }

    MetricOutcome::new(score, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ScoringTuning;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ctx(tuning: &ScoringTuning) -> MetricContext<'_> {
        MetricContext {
            now: now(),
            tuning,
        }
    }

    fn aged(delta: Duration) -> Record {
        Record::new().with("extracted_date", (now() - delta).to_rfc3339())
    }

    #[test]
    fn test_fresh_within_window() {
        let tuning = ScoringTuning::default();
        let outcome = score(&aged(Duration::hours(3)), &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 1.0);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_floor_past_horizon() {
        let tuning = ScoringTuning::default();
        let outcome = score(&aged(Duration::days(90)), &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 0.2);
        assert_eq!(outcome.issues[0].code, IssueCode::StaleData);
    }

    #[test]
    fn test_decay_is_monotonic() {
        let tuning = ScoringTuning::default();
        let rules = CategoryRules::default();
        let mut last = 1.0;
        for days in [1, 2, 5, 10, 15, 20, 29, 30, 45] {
            let s = score(&aged(Duration::days(days)), &rules, &ctx(&tuning)).score;
            assert!(s <= last, "score at {days} days rose from {last} to {s}");
            assert!((0.2..=1.0).contains(&s));
            last = s;
        }
    }

    #[test]
    fn test_missing_timestamp_is_neutral() {
        let tuning = ScoringTuning::default();
        let outcome = score(&Record::new(), &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 0.5);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_unparsable_timestamp() {
        let tuning = ScoringTuning::default();
        let record = Record::new().with("extracted_date", "last tuesday");
        let outcome = score(&record, &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 0.2);
        assert_eq!(outcome.issues[0].key(), "INVALID_TIMESTAMP:extracted_date");
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let tuning = ScoringTuning::default();
        let record = Record::new().with("extracted_date", (now() + Duration::days(2)).to_rfc3339());
        let outcome = score(&record, &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 1.0);
    }

    #[test]
    fn test_huge_windows_do_not_overflow() {
        let tuning = ScoringTuning {
            fresh_window_hours: i64::MAX,
            stale_after_days: i64::MAX,
            ..Default::default()
        };
        let outcome = score(&aged(Duration::days(3650)), &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 1.0);
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        for raw in [
            "2024-06-01T00:00:00Z",
            "2024-06-01T05:30:00+05:30",
            "2024-06-01T00:00:00",
            "2024-06-01T00:00:00.000000",
            "2024-06-01 00:00:00",
            "2024-06-01",
        ] {
            assert_eq!(parse_timestamp(&FieldValue::from(raw)), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_timestamp(&FieldValue::Number(expected.timestamp() as f64)),
            Some(expected)
        );
    }

    #[test]
    fn test_timestamp_field_priority() {
        let tuning = ScoringTuning::default();
        let record = Record::new()
            .with("extracted_date", (now() - Duration::hours(1)).to_rfc3339())
            .with("last_updated", (now() - Duration::days(60)).to_rfc3339());
        let outcome = score(&record, &CategoryRules::default(), &ctx(&tuning));
        assert_eq!(outcome.score, 1.0);
    }
}
