use serde_json::json;

use crate::context::InsightInputs;
use crate::insight::{Insight, InsightKind};

/// Extrapolate conversion loss from the mean page load time.
///
/// Loss grows linearly per second over the target load time and is capped
/// at `max_loss`.
#[allow(clippy::cast_precision_loss)]
pub fn business_impact(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let times: Vec<f64> = inputs.pages.iter().filter_map(|page| page.load_time).collect();
    if times.is_empty() {
        return Vec::new();
    }

    let average = times.iter().sum::<f64>() / times.len() as f64;
    let config = inputs.impact;
    if average <= config.target_load_time {
        return Vec::new();
    }

    let over = average - config.target_load_time;
    let loss = (over / 1_000.0 * config.loss_per_second).min(config.max_loss);

    vec![
        Insight::new(
            InsightKind::BusinessImpact,
            format!(
                "Pages take {:.1} s to load on average, {:.1} s over target; this may cost about {loss:.0}% of conversions",
                average / 1_000.0,
                over / 1_000.0,
            ),
        )
        .with_detail(json!({
            "average_load_time": average,
            "target_load_time": config.target_load_time,
            "estimated_loss": loss,
            "pages": times.len(),
        })),
    ]
}
