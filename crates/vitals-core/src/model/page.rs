use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::lenient;
use crate::model::{Diagnostics, LargeFile, Metric};

const DIFF_SUFFIX: &str = "_diff";

/// Derived per-page record for one period.
///
/// On the wire every asset category and metric is a top-level key with a
/// parallel `<key>_diff` when a previous record existed, e.g.
/// `{"url": .., "script": 420000, "script_diff": -3000, ..}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageRecordRepr", into = "PageRecordRepr")]
pub struct PageRecord {
    pub url: String,
    pub name: String,
    pub score: Option<i64>,
    pub load_time: Option<f64>,
    pub weight: Option<f64>,
    pub load_time_diff: Option<f64>,
    pub weight_diff: Option<f64>,
    pub assets: BTreeMap<String, f64>,
    pub asset_diffs: BTreeMap<String, f64>,
    pub metrics: BTreeMap<Metric, f64>,
    pub metric_diffs: BTreeMap<Metric, f64>,
    pub large_files: Vec<LargeFile>,
    pub diagnostics: Diagnostics,
}

impl PageRecord {
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    #[must_use]
    pub fn metric_diff(&self, metric: Metric) -> Option<f64> {
        self.metric_diffs.get(&metric).copied()
    }

    /// Sum of all asset category weights.
    #[must_use]
    pub fn asset_total(&self) -> f64 {
        self.assets.values().sum()
    }
}

#[derive(Serialize, Deserialize)]
struct PageRecordRepr {
    url: String,
    #[serde(default)]
    name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_integer"
    )]
    score: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_number"
    )]
    load_time: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_number"
    )]
    weight: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_number"
    )]
    load_time_diff: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_number"
    )]
    weight_diff: Option<f64>,
    #[serde(default, deserialize_with = "lenient::entries")]
    large_files: Vec<LargeFile>,
    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    diagnostics: Diagnostics,
    /// Asset categories, metrics and their `_diff` companions.
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl From<PageRecordRepr> for PageRecord {
    fn from(repr: PageRecordRepr) -> Self {
        let mut record = Self {
            url: repr.url,
            name: repr.name,
            score: repr.score,
            load_time: repr.load_time,
            weight: repr.weight,
            load_time_diff: repr.load_time_diff,
            weight_diff: repr.weight_diff,
            large_files: repr.large_files,
            diagnostics: repr.diagnostics,
            ..Self::default()
        };

        for (key, value) in repr.fields {
            let Some(number) = value.as_f64() else {
                continue;
            };
            match key.strip_suffix(DIFF_SUFFIX) {
                Some(base) => match Metric::from_key(base) {
                    Some(metric) => {
                        record.metric_diffs.insert(metric, number);
                    }
                    None => {
                        record.asset_diffs.insert(base.to_string(), number);
                    }
                },
                None => match Metric::from_key(&key) {
                    Some(metric) => {
                        record.metrics.insert(metric, number);
                    }
                    None => {
                        record.assets.insert(key, number);
                    }
                },
            }
        }

        record
    }
}

impl From<PageRecord> for PageRecordRepr {
    fn from(record: PageRecord) -> Self {
        let mut fields = BTreeMap::new();
        for (category, weight) in record.assets {
            fields.insert(category, Value::from(weight));
        }
        for (category, diff) in record.asset_diffs {
            fields.insert(format!("{category}{DIFF_SUFFIX}"), Value::from(diff));
        }
        for (metric, value) in record.metrics {
            fields.insert(metric.key().to_string(), Value::from(value));
        }
        for (metric, diff) in record.metric_diffs {
            fields.insert(format!("{}{DIFF_SUFFIX}", metric.key()), Value::from(diff));
        }

        Self {
            url: record.url,
            name: record.name,
            score: record.score,
            load_time: record.load_time,
            weight: record.weight,
            load_time_diff: record.load_time_diff,
            weight_diff: record.weight_diff,
            large_files: record.large_files,
            diagnostics: record.diagnostics,
            fields,
        }
    }
}
