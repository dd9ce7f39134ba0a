//! Period aggregation across all page records.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::lenient::SCORE_RANGE;
use crate::model::{EnvironmentSnapshot, PageRecord, ReportRecord};

/// Floor of the mean score over the pages with a score in 0-100; `0` when
/// none have one.
#[must_use]
pub fn average_score(pages: &[PageRecord]) -> i64 {
    let scores: Vec<i64> = pages
        .iter()
        .filter_map(|page| page.score)
        .filter(|score| SCORE_RANGE.contains(score))
        .collect();
    if scores.is_empty() {
        return 0;
    }
    let count = i64::try_from(scores.len()).unwrap_or(i64::MAX);
    scores.iter().sum::<i64>().div_euclid(count)
}

/// Build the period report.
///
/// `environment` is the inventory captured for this period. The
/// `changes`/`insights` counters start at zero and are filled in by the
/// stages that produce them.
#[must_use]
pub fn aggregate(
    pages: &[PageRecord],
    previous: Option<&ReportRecord>,
    environment: EnvironmentSnapshot,
    now: DateTime<Utc>,
) -> ReportRecord {
    let average_score = average_score(pages);
    let average_score_diff = previous.map_or(0, |report| {
        average_score.saturating_sub(report.average_score)
    });

    debug!(
        pages = pages.len(),
        average_score, average_score_diff, "aggregated period report"
    );

    ReportRecord {
        average_score,
        average_score_diff,
        changes: 0,
        insights: 0,
        environment,
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(score: Option<i64>) -> PageRecord {
        PageRecord {
            score,
            ..PageRecord::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).single().expect("valid time")
    }

    #[test]
    fn average_is_floored() {
        let report = aggregate(
            &[page(Some(80)), page(Some(81))],
            None,
            EnvironmentSnapshot::default(),
            now(),
        );
        assert_eq!(report.average_score, 80);
        assert_eq!(report.average_score_diff, 0);
        assert_eq!(report.changes, 0);
        assert_eq!(report.insights, 0);
        assert_eq!(report.generated_at, now());
    }

    #[test]
    fn empty_period_averages_to_zero() {
        let report = aggregate(&[], None, EnvironmentSnapshot::default(), now());
        assert_eq!(report.average_score, 0);
    }

    #[test]
    fn pages_without_score_are_excluded() {
        assert_eq!(average_score(&[page(Some(90)), page(None), page(Some(71))]), 80);
        assert_eq!(average_score(&[page(None)]), 0);
    }

    #[test]
    fn out_of_range_scores_are_excluded() {
        assert_eq!(average_score(&[page(Some(150)), page(Some(-20))]), 0);
        assert_eq!(average_score(&[page(Some(150)), page(Some(-20)), page(Some(64))]), 64);
        assert_eq!(average_score(&[page(Some(i64::MAX)), page(Some(1))]), 1);
    }

    #[test]
    fn diff_saturates_on_corrupt_previous() {
        let mut previous = aggregate(&[], None, EnvironmentSnapshot::default(), now());
        previous.average_score = i64::MIN;
        let report = aggregate(
            &[page(Some(70))],
            Some(&previous),
            EnvironmentSnapshot::default(),
            now(),
        );
        assert_eq!(report.average_score_diff, i64::MAX);
    }

    #[test]
    fn diff_against_previous_report() {
        let previous = aggregate(&[page(Some(60))], None, EnvironmentSnapshot::default(), now());
        let report = aggregate(
            &[page(Some(75))],
            Some(&previous),
            EnvironmentSnapshot::default(),
            now(),
        );
        assert_eq!(report.average_score_diff, 15);
    }

    #[test]
    fn identical_input_fed_back_has_zero_diff() {
        let pages = [page(Some(55)), page(Some(92)), page(Some(77))];
        let first = aggregate(&pages, None, EnvironmentSnapshot::default(), now());
        let second = aggregate(&pages, Some(&first), EnvironmentSnapshot::default(), now());
        assert_eq!(second.average_score, first.average_score);
        assert_eq!(second.average_score_diff, 0);
    }
}
