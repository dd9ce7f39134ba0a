//! Per-page lab metric checks: a value above its ceiling, or a regression
//! larger than the allowed delta since last period.

use serde_json::json;
use vitals_core::config::MetricThreshold;
use vitals_core::model::Metric;

use super::format_millis;
use crate::context::InsightInputs;
use crate::insight::{Insight, InsightKind};

pub fn layout_shift(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::LayoutShift,
        Metric::CumulativeLayoutShift,
        inputs.thresholds.layout_shift,
    )
}

pub fn input_delay(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::InputDelay,
        Metric::MaxPotentialFid,
        inputs.thresholds.input_delay,
    )
}

pub fn largest_paint(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::LargestPaint,
        Metric::LargestContentfulPaint,
        inputs.thresholds.largest_paint,
    )
}

pub fn time_to_interactive(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::TimeToInteractive,
        Metric::Interactive,
        inputs.thresholds.time_to_interactive,
    )
}

pub fn bootup_time(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::BootupTime,
        Metric::BootupTime,
        inputs.thresholds.bootup_time,
    )
}

pub fn blocking_time(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    metric_insights(
        inputs,
        InsightKind::BlockingTime,
        Metric::TotalBlockingTime,
        inputs.thresholds.blocking_time,
    )
}

fn metric_insights(
    inputs: &InsightInputs<'_>,
    kind: InsightKind,
    metric: Metric,
    threshold: MetricThreshold,
) -> Vec<Insight> {
    inputs
        .pages
        .iter()
        .filter_map(|page| {
            let value = page.metric(metric)?;
            let diff = page.metric_diff(metric);
            if !threshold.is_exceeded(value, diff) {
                return None;
            }

            let message = if value > threshold.limit {
                format!(
                    "{} on {} is {}, above the {} limit",
                    metric.label(),
                    page.name,
                    format_value(metric, value),
                    format_value(metric, threshold.limit)
                )
            } else {
                format!(
                    "{} on {} regressed by {} to {}",
                    metric.label(),
                    page.name,
                    format_value(metric, diff.unwrap_or_default()),
                    format_value(metric, value)
                )
            };

            Some(Insight::new(kind, message).for_page(page).with_detail(json!({
                "metric": metric,
                "value": value,
                "diff": diff,
                "limit": threshold.limit,
                "delta": threshold.delta,
            })))
        })
        .collect()
}

fn format_value(metric: Metric, value: f64) -> String {
    if metric.unit().is_empty() {
        format!("{value:.2}")
    } else {
        format_millis(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::fixtures::{impact, page, report, thresholds};

    #[test]
    fn value_over_limit_is_reported() {
        let pages = [
            page("slow", json!({"largest_contentful_paint": 3200})),
            page("fast", json!({"largest_contentful_paint": 1200})),
            page("unmeasured", json!({})),
        ];
        let (report, thresholds, impact) = (report(80, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);

        let insights = largest_paint(&inputs);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].name.as_deref(), Some("slow"));
        assert_eq!(insights[0].priority, 4);
        assert_eq!(
            insights[0].message,
            "Largest contentful paint on slow is 3.2 s, above the 2.5 s limit"
        );
        assert_eq!(insights[0].detail["metric"], json!("largest_contentful_paint"));
    }

    #[test]
    fn regression_under_limit_is_reported() {
        let pages = [page(
            "home",
            json!({"total_blocking_time": 250, "total_blocking_time_diff": 150}),
        )];
        let (report, thresholds, impact) = (report(80, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);

        let insights = blocking_time(&inputs);
        assert_eq!(insights.len(), 1);
        assert_eq!(
            insights[0].message,
            "Total blocking time on home regressed by 150 ms to 250 ms"
        );
        assert_eq!(insights[0].detail["diff"], json!(150.0));
    }

    #[test]
    fn layout_shift_is_unitless() {
        let pages = [page("home", json!({"cumulative_layout_shift": 0.25}))];
        let (report, thresholds, impact) = (report(80, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);

        let insights = layout_shift(&inputs);
        assert_eq!(
            insights[0].message,
            "Cumulative layout shift on home is 0.25, above the 0.10 limit"
        );
    }

    #[test]
    fn improvements_are_quiet() {
        let pages = [page(
            "home",
            json!({"interactive": 3000, "interactive_diff": -900, "bootup_time": 400}),
        )];
        let (report, thresholds, impact) = (report(80, 0), thresholds(), impact());
        let inputs = InsightInputs::new(&report, &pages, &thresholds, &impact);

        assert!(time_to_interactive(&inputs).is_empty());
        assert!(bootup_time(&inputs).is_empty());
        assert!(input_delay(&inputs).is_empty());
    }
}
