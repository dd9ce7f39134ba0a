//! `vitals mute`: silence one insight category for seven days.

use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use vitals_core::error::ErrorCode;
use vitals_core::mute::MuteStore;
use vitals_insights::InsightKind;

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `vitals mute`.
#[derive(Args, Debug)]
pub struct MuteArgs {
    /// Insight type to mute (see `vitals palette`).
    #[arg(value_name = "TYPE")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
struct MuteReport {
    #[serde(rename = "type")]
    kind: String,
    outcome: &'static str,
    muted_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

/// Execute `vitals mute`.
///
/// There is no unmute: a mute lapses seven days after it was last set.
pub fn run_mute(args: &MuteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let Some(kind) = InsightKind::from_key(&args.kind) else {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::UnknownInsightType,
                format!("unknown insight type '{}'", args.kind),
            ),
        )?;
        anyhow::bail!("unknown insight type '{}'", args.kind);
    };

    let store = MuteStore::new(project_root);
    let outcome = match store.mute(kind.key(), Utc::now()) {
        Ok(outcome) => outcome,
        Err(err) => {
            render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
            anyhow::bail!("mute of '{kind}' was not recorded");
        }
    };

    let registry = store.load().unwrap_or_default();
    let report = MuteReport {
        kind: kind.key().to_string(),
        outcome: outcome.as_str(),
        muted_at: registry.muted_at(kind.key()),
        expires_at: registry.expires_at(kind.key()),
    };

    render_mode(
        output,
        &report,
        |report, w| writeln!(w, "{} {}", report.outcome, report.kind),
        |report, w| {
            pretty_section(w, &format!("Muted {}", kind.label()))?;
            pretty_kv(w, "Outcome", report.outcome)?;
            if let Some(expires_at) = report.expires_at {
                pretty_kv(w, "Expires", expires_at.to_rfc3339())?;
            }
            Ok(())
        },
    )
}
