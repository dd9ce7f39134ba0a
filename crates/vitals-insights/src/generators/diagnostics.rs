//! Checks over the per-resource diagnostics lists carried on page records.

use serde_json::json;
use vitals_core::model::{Diagnostics, ResourceHit};

use super::format_millis;
use crate::context::InsightInputs;
use crate::insight::{Insight, InsightKind};

const LISTED_OFFENDERS: usize = 5;

pub fn render_blocking(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    resource_insights(
        inputs,
        InsightKind::RenderBlocking,
        |d| d.render_blocking.as_slice(),
        |count, name| format!("{count} render-blocking resources delay first paint on {name}"),
    )
}

pub fn font_display(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    resource_insights(
        inputs,
        InsightKind::FontDisplay,
        |d| d.font_display.as_slice(),
        |count, name| format!("{count} web fonts on {name} hide text while loading"),
    )
}

pub fn document_write(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    resource_insights(
        inputs,
        InsightKind::DocumentWrite,
        |d| d.document_write.as_slice(),
        |count, name| format!("{count} scripts on {name} use document.write"),
    )
}

pub fn redirects(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    resource_insights(
        inputs,
        InsightKind::Redirects,
        |d| d.redirects.as_slice(),
        |count, name| format!("{name} goes through {count} redirects before loading"),
    )
}

fn resource_insights(
    inputs: &InsightInputs<'_>,
    kind: InsightKind,
    select: fn(&Diagnostics) -> &[ResourceHit],
    describe: fn(usize, &str) -> String,
) -> Vec<Insight> {
    inputs
        .pages
        .iter()
        .filter_map(|page| {
            let hits = select(&page.diagnostics);
            if hits.is_empty() {
                return None;
            }

            let wasted: f64 = hits.iter().filter_map(|hit| hit.wasted_ms).sum();
            let offenders: Vec<&str> = hits
                .iter()
                .take(LISTED_OFFENDERS)
                .map(|hit| hit.url.as_str())
                .collect();

            Some(
                Insight::new(kind, describe(hits.len(), &page.name))
                    .for_page(page)
                    .with_detail(json!({
                        "count": hits.len(),
                        "wasted_ms": wasted,
                        "resources": offenders,
                    })),
            )
        })
        .collect()
}

/// Third-party code blocking the main thread for longer than
/// `third_party_blocking` milliseconds in total.
pub fn third_party(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let limit = inputs.thresholds.third_party_blocking;

    inputs
        .pages
        .iter()
        .filter_map(|page| {
            let hits = &page.diagnostics.third_party;
            let total: f64 = hits.iter().map(|hit| hit.blocking_time).sum();
            if total <= limit {
                return None;
            }

            let mut ranked: Vec<_> = hits.iter().collect();
            ranked.sort_by(|a, b| b.blocking_time.total_cmp(&a.blocking_time));
            let entities: Vec<_> = ranked
                .iter()
                .take(LISTED_OFFENDERS)
                .map(|hit| json!({"entity": hit.entity, "blocking_time": hit.blocking_time}))
                .collect();

            Some(
                Insight::new(
                    InsightKind::ThirdParty,
                    format!(
                        "Third-party code blocks the main thread for {} on {}",
                        format_millis(total),
                        page.name
                    ),
                )
                .for_page(page)
                .with_detail(json!({
                    "blocking_time": total,
                    "entities": entities,
                })),
            )
        })
        .collect()
}
