//! Per-page diffing of a raw audit against last period's page record.

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::model::{LargeFile, PageRecord, RawAudit};
use crate::source::SourceResolver;

/// Build this period's record for one page.
///
/// Summary, assets, metrics, large files and diagnostics are copied from
/// `current`. With a `previous` record every field present on both sides
/// gets a `current - previous` diff, and large files already flagged last
/// period are marked `old`. Every large file is attributed through
/// `sources`.
#[must_use]
pub fn diff(
    current: &RawAudit,
    previous: Option<&PageRecord>,
    sources: &dyn SourceResolver,
) -> PageRecord {
    let mut record = PageRecord {
        url: current.url.clone(),
        name: current.label(),
        score: current.summary.score,
        load_time: current.summary.load_time,
        weight: current.summary.weight,
        assets: current.assets.clone(),
        metrics: current.metrics.clone(),
        diagnostics: current.diagnostics.clone(),
        ..PageRecord::default()
    };

    let previous_files: HashSet<&str> = previous
        .map(|page| page.large_files.iter().map(|file| file.url.as_str()).collect())
        .unwrap_or_default();

    record.large_files = current
        .large_files
        .iter()
        .map(|file| LargeFile {
            source: Some(sources.resolve(&file.url)),
            old: previous_files.contains(file.url.as_str()),
            ..file.clone()
        })
        .collect();

    let Some(previous) = previous else {
        debug!(name = %record.name, "no previous record, baseline page");
        return record;
    };

    record.load_time_diff = field_diff(record.load_time, previous.load_time);
    record.weight_diff = field_diff(record.weight, previous.weight);
    record.asset_diffs = map_diff(&record.assets, &previous.assets);
    record.metric_diffs = map_diff(&record.metrics, &previous.metrics);

    debug!(
        name = %record.name,
        assets = record.asset_diffs.len(),
        metrics = record.metric_diffs.len(),
        "diffed page against previous record"
    );
    record
}

fn field_diff(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

fn map_diff<K: Ord + Clone>(
    current: &BTreeMap<K, f64>,
    previous: &BTreeMap<K, f64>,
) -> BTreeMap<K, f64> {
    current
        .iter()
        .filter_map(|(key, value)| {
            previous
                .get(key)
                .map(|before| (key.clone(), value - before))
        })
        .collect()
}

/// Find last period's record for a page by its label.
#[must_use]
pub fn find_previous<'a>(previous_pages: &'a [PageRecord], name: &str) -> Option<&'a PageRecord> {
    previous_pages.iter().find(|page| page.name == name)
}
