use serde_json::json;

use crate::context::InsightInputs;
use crate::insight::{Insight, InsightKind};

const WORST_PAGES: usize = 3;
const RECENT_CHANGES: usize = 3;

/// Site-wide average score below the "good" band.
pub fn score(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let mut scored: Vec<(&str, i64)> = inputs
        .pages
        .iter()
        .filter_map(|page| page.score.map(|score| (page.name.as_str(), score)))
        .collect();
    if scored.is_empty() {
        return Vec::new();
    }

    let thresholds = inputs.thresholds;
    let average = inputs.report.average_score;
    if average >= thresholds.score_good {
        return Vec::new();
    }

    let grade = if average < thresholds.score_poor {
        "poor"
    } else {
        "needs_improvement"
    };
    scored.sort_by_key(|(_, score)| *score);
    let worst: Vec<_> = scored
        .iter()
        .take(WORST_PAGES)
        .map(|(name, score)| json!({"name": name, "score": score}))
        .collect();

    let message = if grade == "poor" {
        format!("Average performance score is {average}, which is poor")
    } else {
        format!(
            "Average performance score is {average}, below the {} needed for a good rating",
            thresholds.score_good
        )
    };

    vec![Insight::new(InsightKind::Score, message).with_detail(json!({
        "average_score": average,
        "grade": grade,
        "worst_pages": worst,
    }))]
}

/// A score swing of at least `score_trend_min` points since last period,
/// tied to the environment changes that happened in between.
pub fn score_trend(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let Some(previous) = inputs.previous_report else {
        return Vec::new();
    };

    let diff = inputs.report.average_score_diff;
    if diff.saturating_abs() < inputs.thresholds.score_trend_min {
        return Vec::new();
    }

    let direction = if diff > 0 { "improved" } else { "dropped" };
    let recent: Vec<String> = inputs
        .changes
        .iter()
        .take(RECENT_CHANGES)
        .map(ToString::to_string)
        .collect();

    let mut message = format!(
        "Average score {direction} by {} points ({} -> {})",
        diff.saturating_abs(),
        previous.average_score,
        inputs.report.average_score
    );
    match inputs.changes.len() {
        0 => {}
        1 => message.push_str(" after 1 environment change"),
        count => message.push_str(&format!(" after {count} environment changes")),
    }

    vec![Insight::new(InsightKind::ScoreTrend, message).with_detail(json!({
        "average_score": inputs.report.average_score,
        "previous_score": previous.average_score,
        "diff": diff,
        "direction": direction,
        "changes": inputs.changes.len(),
        "recent_changes": recent,
    }))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::fixtures::{impact, page, report, thresholds};
    use vitals_core::model::{ChangeAction, ChangeEvent, ChangeSubject, ObjectType};

    #[test]
    fn good_average_is_quiet() {
        let pages = [page("a", json!({"score": 95}))];
        let (report, thresholds, impact) = (report(95, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);
        assert!(score(&inputs).is_empty());
    }

    #[test]
    fn no_scored_pages_is_quiet() {
        let pages = [page("a", json!({}))];
        let (report, thresholds, impact) = (report(0, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);
        assert!(score(&inputs).is_empty());
    }

    #[test]
    fn low_average_lists_worst_pages() {
        let pages = [
            page("a", json!({"score": 40})),
            page("b", json!({"score": 90})),
            page("c", json!({"score": 20})),
            page("d", json!({"score": 60})),
        ];
        let (report, thresholds, impact) = (report(52, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);

        let insights = score(&inputs);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].detail["grade"], json!("needs_improvement"));
        let worst = insights[0].detail["worst_pages"].as_array().expect("array");
        assert_eq!(worst.len(), 3);
        assert_eq!(worst[0]["name"], json!("c"));
        assert_eq!(worst[2]["name"], json!("d"));
    }

    #[test]
    fn poor_grade_below_poor_threshold() {
        let pages = [page("a", json!({"score": 30}))];
        let (report, thresholds, impact) = (report(30, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);
        assert_eq!(score(&inputs)[0].detail["grade"], json!("poor"));
    }

    #[test]
    fn trend_needs_previous_report() {
        let (report, thresholds, impact) = (report(70, -12), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &[], &thresholds, &impact);
        assert!(score_trend(&inputs).is_empty());
    }

    #[test]
    fn small_swings_are_ignored() {
        let previous = report(72, 0);
        let (report, thresholds, impact) = (report(70, -2), thresholds(), impact());
        let inputs = InsightInputs {
            previous_report: Some(&previous),
            ..InsightInputs::new(&report, &[], &thresholds, &impact)
        };
        assert!(score_trend(&inputs).is_empty());
    }

    #[test]
    fn drop_reports_environment_changes() {
        let previous = report(82, 0);
        let (report, thresholds, impact) = (report(70, -12), thresholds(), impact());
        let changes: Vec<ChangeEvent> = (0..4)
            .map(|n| {
                ChangeEvent::new(
                    ChangeAction::Activate,
                    ChangeSubject::new(ObjectType::Plugin, format!("plugin-{n}"), "1.0"),
                    None,
                )
            })
            .collect();
        let inputs = InsightInputs {
            previous_report: Some(&previous),
            changes: &changes,
            ..InsightInputs::new(&report, &[], &thresholds, &impact)
        };

        let insights = score_trend(&inputs);
        assert_eq!(insights.len(), 1);
        assert_eq!(
            insights[0].message,
            "Average score dropped by 12 points (82 -> 70) after 4 environment changes"
        );
        assert_eq!(insights[0].detail["changes"], json!(4));
        assert_eq!(
            insights[0].detail["recent_changes"],
            json!([
                "activate plugin plugin-0 1.0",
                "activate plugin plugin-1 1.0",
                "activate plugin plugin-2 1.0"
            ])
        );
    }
}
