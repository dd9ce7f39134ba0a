use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::lenient;
use crate::model::Metric;

/// One page's unprocessed measurement for a period.
///
/// Every field except `url` is optional on the wire; see [`crate::lenient`]
/// for how partial payloads are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAudit {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: AuditSummary,
    /// Byte weight per asset category (`script`, `image`, `font`, ...).
    #[serde(default, deserialize_with = "lenient::numbers")]
    pub assets: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub large_files: Vec<LargeFile>,
    #[serde(default, deserialize_with = "lenient::metrics")]
    pub metrics: BTreeMap<Metric, f64>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl RawAudit {
    /// Human label used to match this page against last period's record.
    #[must_use]
    pub fn label(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => page_label(&self.url),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Performance score, 0-100.
    #[serde(default, deserialize_with = "lenient::opt_score")]
    pub score: Option<i64>,
    /// Fully-loaded time in milliseconds.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub load_time: Option<f64>,
    /// Total transfer size in bytes.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub weight: Option<f64>,
}

/// A large transferred file flagged by the audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeFile {
    pub url: String,
    #[serde(default)]
    pub byte_size: f64,
    /// Who ships this file, filled in when the page record is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The same URL was flagged on the previous period's record.
    #[serde(default)]
    pub old: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Per-resource findings lifted out of the audit's diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::entries")]
    pub render_blocking: Vec<ResourceHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::entries")]
    pub font_display: Vec<ResourceHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::entries")]
    pub third_party: Vec<ThirdPartyHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::entries")]
    pub document_write: Vec<ResourceHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::entries")]
    pub redirects: Vec<ResourceHit>,
}

impl Diagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.render_blocking.is_empty()
            && self.font_display.is_empty()
            && self.third_party.is_empty()
            && self.document_write.is_empty()
            && self.redirects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHit {
    pub url: String,
    /// Estimated time cost in milliseconds, when the audit reports one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_number"
    )]
    pub wasted_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyHit {
    pub entity: String,
    #[serde(default)]
    pub blocking_time: f64,
    #[serde(default)]
    pub transfer_size: f64,
}

/// Derive a page label from its URL path: `/` is `Home`, otherwise the path
/// without surrounding slashes.
#[must_use]
pub fn page_label(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("", |index| &without_scheme[index..])
    } else {
        without_scheme
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');

    if trimmed.is_empty() {
        "Home".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_partial_audit() {
        let audit: RawAudit = serde_json::from_value(json!({
            "url": "https://example.com/shop/",
            "summary": {"score": 71, "load_time": 2400.5},
            "assets": {"script": 420000, "image": "unknown"},
            "large_files": [
                {"url": "https://example.com/hero.jpg", "byte_size": 900000, "mime": "image/jpeg"},
                {"byte_size": 10}
            ],
            "metrics": {"largest_contentful_paint": 3100, "speed_index": 2000}
        }))
        .expect("audit decodes");

        assert_eq!(audit.summary.score, Some(71));
        assert_eq!(audit.summary.weight, None);
        assert_eq!(audit.assets.len(), 1);
        assert_eq!(audit.large_files.len(), 1);
        assert_eq!(audit.large_files[0].extra["mime"], json!("image/jpeg"));
        assert_eq!(
            audit.metrics.get(&Metric::LargestContentfulPaint),
            Some(&3100.0)
        );
        assert_eq!(audit.metrics.len(), 1);
        assert!(audit.diagnostics.is_empty());
    }

    #[test]
    fn missing_score_stays_missing() {
        let audit: RawAudit =
            serde_json::from_value(json!({"url": "/", "summary": {"score": null}}))
                .expect("audit decodes");
        assert_eq!(audit.summary.score, None);
    }

    #[test]
    fn out_of_range_score_reads_as_missing() {
        let audit: RawAudit =
            serde_json::from_value(json!({"url": "/", "summary": {"score": 150, "load_time": 900}}))
                .expect("audit decodes");
        assert_eq!(audit.summary.score, None);
        assert_eq!(audit.summary.load_time, Some(900.0));
    }

    #[test]
    fn label_prefers_explicit_name() {
        let audit: RawAudit =
            serde_json::from_value(json!({"url": "https://example.com/", "name": "Front page"}))
                .expect("audit decodes");
        assert_eq!(audit.label(), "Front page");
    }

    #[test]
    fn page_label_from_url_path() {
        assert_eq!(page_label("https://example.com"), "Home");
        assert_eq!(page_label("https://example.com/"), "Home");
        assert_eq!(page_label("https://example.com/blog/post-1/?utm=x"), "blog/post-1");
        assert_eq!(page_label("/contact#form"), "contact");
    }
}
