use chrono::{DateTime, Utc};
use tracing::debug;

use vitals_core::mute::MuteRegistry;

use crate::context::InsightInputs;
use crate::insight::Insight;
use crate::palette::{CategoryInfo, PALETTE, PaletteEntry};

/// Runs the palette against one period's inputs, skipping muted categories.
#[derive(Debug, Clone)]
pub struct InsightOrchestrator {
    entries: Vec<PaletteEntry>,
}

impl Default for InsightOrchestrator {
    fn default() -> Self {
        Self::with_entries(PALETTE.to_vec())
    }
}

impl InsightOrchestrator {
    /// Orchestrate a custom palette. Entries are kept in ascending priority,
    /// ties in the order given.
    #[must_use]
    pub fn with_entries(mut entries: Vec<PaletteEntry>) -> Self {
        entries.sort_by_key(PaletteEntry::priority);
        Self { entries }
    }

    /// Category metadata for presentation, independent of mute state.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryInfo> {
        self.entries.iter().map(PaletteEntry::info).collect()
    }

    /// Generate this period's insights.
    ///
    /// Mute state is read once, as of `now`. Each unmuted category's output
    /// is appended in palette order. Insights that match one from
    /// `inputs.previous_insights` by type and page are flagged `recurring`.
    #[must_use]
    pub fn generate(
        &self,
        inputs: &InsightInputs<'_>,
        mutes: &MuteRegistry,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let muted = mutes.active_mutes(now);
        let mut insights = Vec::new();

        for entry in &self.entries {
            if entry.is_muted(&muted) {
                debug!(kind = %entry.kind, "category muted, skipping");
                continue;
            }

            let mut produced = (entry.generate)(inputs);
            for insight in &mut produced {
                insight.recurring = inputs
                    .previous_insights
                    .iter()
                    .any(|previous| previous.same_subject(insight));
            }

            debug!(kind = %entry.kind, count = produced.len(), "category generated");
            insights.extend(produced);
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightKind;
    use chrono::TimeZone;
    use vitals_core::config::{ImpactConfig, ThresholdConfig};
    use vitals_core::model::{PageRecord, ReportRecord};

    fn one(kind: InsightKind) -> Vec<Insight> {
        vec![Insight::new(kind, kind.key())]
    }

    fn redirects(_: &InsightInputs<'_>) -> Vec<Insight> {
        one(InsightKind::Redirects)
    }

    fn score(_: &InsightInputs<'_>) -> Vec<Insight> {
        one(InsightKind::Score)
    }

    fn impact(_: &InsightInputs<'_>) -> Vec<Insight> {
        one(InsightKind::BusinessImpact)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("valid time")
    }

    fn orchestrator() -> InsightOrchestrator {
        InsightOrchestrator::with_entries(vec![
            PaletteEntry::new(InsightKind::Redirects, redirects),
            PaletteEntry::new(InsightKind::Score, score),
            PaletteEntry::new(InsightKind::BusinessImpact, impact),
        ])
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|insight| insight.kind).collect()
    }

    #[test]
    fn output_follows_priority_order() {
        let (report, thresholds, impact) = (
            ReportRecord::default(),
            ThresholdConfig::default(),
            ImpactConfig::default(),
        );
        let inputs = InsightInputs::new(&report, &[], &thresholds, &impact);

        let insights = orchestrator().generate(&inputs, &MuteRegistry::new(), now());
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::BusinessImpact,
                InsightKind::Score,
                InsightKind::Redirects
            ]
        );
    }

    #[test]
    fn muted_categories_contribute_nothing() {
        let (report, thresholds, impact) = (
            ReportRecord::default(),
            ThresholdConfig::default(),
            ImpactConfig::default(),
        );
        let inputs = InsightInputs::new(&report, &[], &thresholds, &impact);
        let mut mutes = MuteRegistry::new();
        mutes.mute("score", now() - chrono::Duration::days(1));
        mutes.mute("redirects", now() - chrono::Duration::days(30));

        let insights = orchestrator().generate(&inputs, &mutes, now());
        assert_eq!(
            kinds(&insights),
            vec![InsightKind::BusinessImpact, InsightKind::Redirects]
        );
    }

    #[test]
    fn repeated_subjects_are_flagged_recurring() {
        let (report, thresholds, impact) = (
            ReportRecord::default(),
            ThresholdConfig::default(),
            ImpactConfig::default(),
        );
        let previous = vec![Insight::new(InsightKind::Score, "last week")];
        let pages: Vec<PageRecord> = Vec::new();
        let inputs = InsightInputs {
            previous_insights: &previous,
            ..InsightInputs::new(&report, &pages, &thresholds, &impact)
        };

        let insights = orchestrator().generate(&inputs, &MuteRegistry::new(), now());
        let recurring: Vec<_> = insights
            .iter()
            .filter(|insight| insight.recurring)
            .map(|insight| insight.kind)
            .collect();
        assert_eq!(recurring, vec![InsightKind::Score]);
    }

    #[test]
    fn categories_ignore_mutes() {
        let categories = InsightOrchestrator::default().categories();
        assert_eq!(categories.len(), PALETTE.len());
        assert_eq!(categories[0].kind, InsightKind::BusinessImpact);
    }
}
