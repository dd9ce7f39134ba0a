use vitals_core::config::{ImpactConfig, ThresholdConfig};
use vitals_core::model::{ChangeEvent, PageRecord, ReportRecord};

use crate::insight::Insight;

/// Everything a generator may read. Shared by every category in a run.
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    pub report: &'a ReportRecord,
    pub previous_report: Option<&'a ReportRecord>,
    pub pages: &'a [PageRecord],
    pub previous_pages: &'a [PageRecord],
    pub previous_insights: &'a [Insight],
    pub changes: &'a [ChangeEvent],
    pub thresholds: &'a ThresholdConfig,
    pub impact: &'a ImpactConfig,
}

impl<'a> InsightInputs<'a> {
    /// Inputs for a run with no history and default settings.
    #[must_use]
    pub fn new(
        report: &'a ReportRecord,
        pages: &'a [PageRecord],
        thresholds: &'a ThresholdConfig,
        impact: &'a ImpactConfig,
    ) -> Self {
        Self {
            report,
            previous_report: None,
            pages,
            previous_pages: &[],
            previous_insights: &[],
            changes: &[],
            thresholds,
            impact,
        }
    }

    /// Last period's record for the page labelled `name`.
    #[must_use]
    pub fn previous_page(&self, name: &str) -> Option<&'a PageRecord> {
        vitals_core::page::find_previous(self.previous_pages, name)
    }
}
