use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::EnvironmentSnapshot;

/// Aggregate record for one period across all audited pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub average_score: i64,
    #[serde(default)]
    pub average_score_diff: i64,
    /// Number of environment change events detected this period.
    #[serde(default)]
    pub changes: usize,
    /// Number of insights emitted this period.
    #[serde(default)]
    pub insights: usize,
    #[serde(rename = "wp_environment", alias = "environment", default)]
    pub environment: EnvironmentSnapshot,
    #[serde(default)]
    pub generated_at: DateTime<Utc>,
}
