use serde_json::json;
use vitals_core::model::PageRecord;

use super::format_bytes;
use crate::context::InsightInputs;
use crate::insight::{Insight, InsightKind};

/// A single asset category dominating a page's transfer weight.
pub fn resources(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let limit = inputs.thresholds.composition_share;

    inputs
        .pages
        .iter()
        .filter_map(|page| {
            let (category, share) = dominant_category(page)?;
            if share <= limit {
                return None;
            }

            let previous_share = inputs
                .previous_page(&page.name)
                .and_then(|previous| previous.assets.get(category).map(|weight| (previous, *weight)))
                .and_then(|(previous, weight)| {
                    let total = previous.asset_total();
                    (total > 0.0).then(|| weight / total)
                });

            Some(
                Insight::new(
                    InsightKind::Resources,
                    format!(
                        "{category} makes up {:.0}% of the weight of {}",
                        share * 100.0,
                        page.name
                    ),
                )
                .for_page(page)
                .with_detail(json!({
                    "category": category,
                    "share": share,
                    "previous_share": previous_share,
                    "weight": page.assets.get(category),
                    "total": page.asset_total(),
                })),
            )
        })
        .collect()
}

fn dominant_category(page: &PageRecord) -> Option<(&str, f64)> {
    let total = page.asset_total();
    if total <= 0.0 {
        return None;
    }
    page.assets
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(category, weight)| (category.as_str(), weight / total))
}

/// Per-category weight growth above `weight_growth` bytes since last period.
pub fn weight_by_type(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let limit = inputs.thresholds.weight_growth;

    inputs
        .pages
        .iter()
        .flat_map(|page| {
            page.asset_diffs
                .iter()
                .filter(move |(_, diff)| **diff > limit)
                .map(move |(category, diff)| {
                    Insight::new(
                        InsightKind::WeightByType,
                        format!(
                            "{category} weight on {} grew by {}",
                            page.name,
                            format_bytes(*diff)
                        ),
                    )
                    .for_page(page)
                    .with_detail(json!({
                        "category": category,
                        "diff": diff,
                        "weight": page.assets.get(category),
                    }))
                })
        })
        .collect()
}
