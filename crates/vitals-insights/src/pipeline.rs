//! One scheduled period, end to end: raw audits and an inventory in,
//! page records, a report, change events and insights out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use vitals_core::config::ProjectConfig;
use vitals_core::model::{ChangeEvent, EnvironmentSnapshot, PageRecord, RawAudit, ReportRecord};
use vitals_core::mute::MuteRegistry;
use vitals_core::source::{self, PathSourceResolver};
use vitals_core::{changes, page, report};

use crate::context::InsightInputs;
use crate::insight::Insight;
use crate::orchestrator::InsightOrchestrator;

/// Everything captured for a period before analysis.
///
/// Audits stay as raw JSON so one undecodable payload can be skipped
/// without losing the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodInput {
    pub audits: Vec<Value>,
    pub environment: EnvironmentSnapshot,
}

/// All records derived for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodOutput {
    pub report: ReportRecord,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
    #[serde(default)]
    pub changes: Vec<ChangeEvent>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

/// Run the whole pipeline for one period.
///
/// `previous` is the most recent earlier period, if any. Pages are matched
/// to their previous record by label. Environment changes are only
/// detected when a previous report exists.
#[instrument(skip_all, fields(audits = input.audits.len(), baseline = previous.is_none()))]
pub fn run_period(
    input: &PeriodInput,
    previous: Option<&PeriodOutput>,
    mutes: &MuteRegistry,
    config: &ProjectConfig,
    orchestrator: &InsightOrchestrator,
    now: DateTime<Utc>,
) -> PeriodOutput {
    let audits = decode_audits(&input.audits);
    let resolver = resolver_for(config, &audits);

    let previous_pages = previous.map_or(&[][..], |period| period.pages.as_slice());
    let pages: Vec<PageRecord> = audits
        .iter()
        .map(|audit| {
            let before = page::find_previous(previous_pages, &audit.label());
            page::diff(audit, before, &resolver)
        })
        .collect();

    let previous_report = previous.map(|period| &period.report);
    let mut report = report::aggregate(&pages, previous_report, input.environment.clone(), now);

    let changes = previous_report.map_or_else(Vec::new, |before| {
        changes::detect(&before.environment, &report.environment)
    });
    report.changes = changes.len();

    let insights = {
        let inputs = InsightInputs {
            report: &report,
            previous_report,
            pages: &pages,
            previous_pages,
            previous_insights: previous.map_or(&[][..], |period| period.insights.as_slice()),
            changes: &changes,
            thresholds: &config.thresholds,
            impact: &config.impact,
        };
        orchestrator.generate(&inputs, mutes, now)
    };
    report.insights = insights.len();

    info!(
        pages = pages.len(),
        average_score = report.average_score,
        changes = report.changes,
        insights = report.insights,
        "period analysed"
    );

    PeriodOutput {
        report,
        pages,
        changes,
        insights,
    }
}

fn decode_audits(raw: &[Value]) -> Vec<RawAudit> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawAudit>(value.clone()) {
            Ok(audit) => Some(audit),
            Err(err) => {
                warn!(index, %err, "skipping undecodable audit");
                None
            }
        })
        .collect()
}

/// Attribute files to `site` by the configured host, or else by the host
/// of the first audited page.
fn resolver_for(config: &ProjectConfig, audits: &[RawAudit]) -> PathSourceResolver {
    let mut sources = config.sources.clone();
    if sources.site_host.is_none() {
        sources.site_host = audits.iter().find_map(|audit| source::url_host(&audit.url));
    }
    PathSourceResolver::from_config(&sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).single().expect("valid time")
    }

    fn run(input: &PeriodInput, previous: Option<&PeriodOutput>) -> PeriodOutput {
        run_period(
            input,
            previous,
            &MuteRegistry::new(),
            &ProjectConfig::default(),
            &InsightOrchestrator::default(),
            now(),
        )
    }

    #[test]
    fn undecodable_audits_are_skipped() {
        let input = PeriodInput {
            audits: vec![
                json!({"url": "https://example.com/", "summary": {"score": 90}}),
                json!({"summary": {"score": 10}}),
                json!("not an audit"),
            ],
            environment: EnvironmentSnapshot::default(),
        };

        let output = run(&input, None);
        assert_eq!(output.pages.len(), 1);
        assert_eq!(output.report.average_score, 90);
    }

    #[test]
    fn site_host_falls_back_to_first_audit() {
        let input = PeriodInput {
            audits: vec![json!({
                "url": "https://example.com/",
                "large_files": [{"url": "https://example.com/uploads/a.jpg", "byte_size": 500_000}]
            })],
            environment: EnvironmentSnapshot::default(),
        };

        let output = run(&input, None);
        assert_eq!(output.pages[0].large_files[0].source.as_deref(), Some("site"));
    }

    #[test]
    fn baseline_period_has_no_changes() {
        let input = PeriodInput {
            audits: vec![json!({"url": "https://example.com/", "summary": {"score": 95}})],
            environment: EnvironmentSnapshot {
                core_version: "6.5".to_string(),
                ..EnvironmentSnapshot::default()
            },
        };

        let output = run(&input, None);
        assert!(output.changes.is_empty());
        assert_eq!(output.report.changes, 0);
        assert_eq!(output.report.insights, output.insights.len());
    }
}
