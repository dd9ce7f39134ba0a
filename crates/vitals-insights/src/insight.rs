use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use vitals_core::model::PageRecord;

/// Insight category. The snake-case key doubles as the mute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    BusinessImpact,
    Score,
    ScoreTrend,
    LayoutShift,
    InputDelay,
    LargestPaint,
    TimeToInteractive,
    Resources,
    WeightByType,
    BootupTime,
    RenderBlocking,
    FontDisplay,
    BlockingTime,
    ThirdParty,
    DocumentWrite,
    Redirects,
}

impl InsightKind {
    pub const ALL: [Self; 16] = [
        Self::BusinessImpact,
        Self::Score,
        Self::ScoreTrend,
        Self::LayoutShift,
        Self::InputDelay,
        Self::LargestPaint,
        Self::TimeToInteractive,
        Self::Resources,
        Self::WeightByType,
        Self::BootupTime,
        Self::RenderBlocking,
        Self::FontDisplay,
        Self::BlockingTime,
        Self::ThirdParty,
        Self::DocumentWrite,
        Self::Redirects,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BusinessImpact => "business_impact",
            Self::Score => "score",
            Self::ScoreTrend => "score_trend",
            Self::LayoutShift => "layout_shift",
            Self::InputDelay => "input_delay",
            Self::LargestPaint => "largest_paint",
            Self::TimeToInteractive => "time_to_interactive",
            Self::Resources => "resources",
            Self::WeightByType => "weight_by_type",
            Self::BootupTime => "bootup_time",
            Self::RenderBlocking => "render_blocking",
            Self::FontDisplay => "font_display",
            Self::BlockingTime => "blocking_time",
            Self::ThirdParty => "third_party",
            Self::DocumentWrite => "document_write",
            Self::Redirects => "redirects",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Fixed urgency, 2 (most urgent) through 7.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::BusinessImpact => 2,
            Self::Score | Self::ScoreTrend => 3,
            Self::LayoutShift | Self::InputDelay | Self::LargestPaint | Self::TimeToInteractive => {
                4
            }
            Self::Resources | Self::WeightByType => 5,
            Self::BootupTime
            | Self::RenderBlocking
            | Self::FontDisplay
            | Self::BlockingTime
            | Self::ThirdParty => 6,
            Self::DocumentWrite | Self::Redirects => 7,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessImpact => "Business impact",
            Self::Score => "Performance score",
            Self::ScoreTrend => "Score trend",
            Self::LayoutShift => "Layout shift",
            Self::InputDelay => "Input delay",
            Self::LargestPaint => "Largest contentful paint",
            Self::TimeToInteractive => "Time to interactive",
            Self::Resources => "Resource composition",
            Self::WeightByType => "Weight by resource type",
            Self::BootupTime => "JavaScript bootup time",
            Self::RenderBlocking => "Render-blocking resources",
            Self::FontDisplay => "Font display",
            Self::BlockingTime => "Total blocking time",
            Self::ThirdParty => "Third-party blocking",
            Self::DocumentWrite => "document.write usage",
            Self::Redirects => "Redirect chains",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A generated, prioritized alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub priority: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// An insight of the same type for the same page was emitted last run.
    #[serde(default)]
    pub recurring: bool,
    /// Category-specific figures.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub detail: Value,
}

impl Insight {
    #[must_use]
    pub fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            priority: kind.priority(),
            message: message.into(),
            url: None,
            name: None,
            recurring: false,
            detail: Value::Null,
        }
    }

    #[must_use]
    pub fn for_page(mut self, page: &PageRecord) -> Self {
        self.url = Some(page.url.clone());
        self.name = Some(page.name.clone());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Same category about the same page (or both site-wide).
    #[must_use]
    pub fn same_subject(&self, other: &Self) -> bool {
        self.kind == other.kind && self.url == other.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_round_trip_and_match_serde() {
        for kind in InsightKind::ALL {
            assert_eq!(InsightKind::from_key(kind.key()), Some(kind));
            let encoded = serde_json::to_value(kind).expect("serialize");
            assert_eq!(encoded, json!(kind.key()));
        }
        assert_eq!(InsightKind::from_key("unmute"), None);
    }

    #[test]
    fn all_is_in_priority_order() {
        let priorities: Vec<u8> = InsightKind::ALL.iter().map(|k| k.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
        assert_eq!(priorities.first(), Some(&2));
        assert_eq!(priorities.last(), Some(&7));
    }

    #[test]
    fn insight_serializes_type_and_priority() {
        let page = PageRecord {
            url: "https://example.com/".to_string(),
            name: "Home".to_string(),
            ..PageRecord::default()
        };
        let insight = Insight::new(InsightKind::LargestPaint, "slow paint")
            .for_page(&page)
            .with_detail(json!({"value": 3100.0}));

        let value = serde_json::to_value(&insight).expect("serialize");
        assert_eq!(value["type"], json!("largest_paint"));
        assert_eq!(value["priority"], json!(4));
        assert_eq!(value["name"], json!("Home"));
        assert_eq!(value["recurring"], json!(false));
        assert_eq!(value["detail"]["value"], json!(3100.0));
    }

    #[test]
    fn site_wide_insight_omits_page_fields() {
        let value = serde_json::to_value(Insight::new(InsightKind::Score, "low")).expect("serialize");
        assert!(value.get("url").is_none());
        assert!(value.get("detail").is_none());
    }
}
