//! `vitals run`: analyse one period of audits against the previous one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use serde_json::Value;
use tracing::warn;

use vitals_core::config::load_project_config;
use vitals_core::error::ErrorCode;
use vitals_core::model::EnvironmentSnapshot;
use vitals_core::mute::{MuteRegistry, MuteStore};
use vitals_insights::{InsightOrchestrator, PeriodInput, PeriodOutput, run_period};

use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode,
};
use crate::state;

/// Arguments for `vitals run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON file holding an array of raw page audits.
    #[arg(long, value_name = "FILE")]
    pub audits: PathBuf,

    /// JSON file holding the installed-software inventory.
    #[arg(long, value_name = "FILE")]
    pub environment: PathBuf,

    /// Period timestamp (RFC 3339). Defaults to the current time.
    #[arg(long, value_name = "RFC3339")]
    pub now: Option<String>,
}

/// Execute `vitals run`.
pub fn run_run(
    args: &RunArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let config = match load_project_config(project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            anyhow::bail!("invalid project config");
        }
    };

    let now = match parse_now(args.now.as_deref()) {
        Ok(now) => now,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::InputParseError, format!("{err:#}")),
            )?;
            anyhow::bail!("invalid --now");
        }
    };

    let input = match read_input(&args.audits, &args.environment) {
        Ok(input) => input,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::InputParseError, format!("{err:#}")),
            )?;
            anyhow::bail!("unreadable period input");
        }
    };

    let previous = state::load_latest(project_root).unwrap_or_else(|err| {
        warn!(err = %format!("{err:#}"), "previous period unreadable; running as baseline");
        None
    });

    let mutes = MuteStore::new(project_root).load().unwrap_or_else(|err| {
        warn!(%err, "mute store unreadable; running without mutes");
        MuteRegistry::default()
    });

    let period = run_period(
        &input,
        previous.as_ref(),
        &mutes,
        &config,
        &InsightOrchestrator::default(),
        now,
    );

    if let Err(err) = state::save_period(project_root, &period) {
        render_error(
            output,
            &CliError::from_code(ErrorCode::StateWriteFailed, format!("{err:#}")),
        )?;
        anyhow::bail!("failed to record period");
    }

    render_mode(
        output,
        &period,
        |period, w| render_text(period, quiet, w),
        |period, w| render_pretty(period, quiet, w),
    )
}

fn parse_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    raw.map_or_else(
        || Ok(Utc::now()),
        |raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.with_timezone(&Utc))
                .with_context(|| format!("invalid --now timestamp '{raw}'"))
        },
    )
}

fn read_input(audits_path: &Path, environment_path: &Path) -> anyhow::Result<PeriodInput> {
    let bytes = fs::read(audits_path)
        .with_context(|| format!("failed to read {}", audits_path.display()))?;
    let audits: Vec<Value> = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of audits", audits_path.display()))?;

    let bytes = fs::read(environment_path)
        .with_context(|| format!("failed to read {}", environment_path.display()))?;
    let environment: EnvironmentSnapshot = serde_json::from_slice(&bytes).with_context(|| {
        format!("{} is not a valid environment inventory", environment_path.display())
    })?;

    Ok(PeriodInput {
        audits,
        environment,
    })
}

fn render_text(period: &PeriodOutput, quiet: bool, w: &mut dyn Write) -> io::Result<()> {
    let report = &period.report;
    writeln!(
        w,
        "period {} score={} diff={:+} pages={} changes={} insights={}",
        report.generated_at.to_rfc3339(),
        report.average_score,
        report.average_score_diff,
        period.pages.len(),
        report.changes,
        report.insights
    )?;
    if quiet {
        return Ok(());
    }
    for change in &period.changes {
        writeln!(w, "change\t{change}")?;
    }
    for insight in &period.insights {
        writeln!(w, "P{}\t{}\t{}", insight.priority, insight.kind, insight.message)?;
    }
    Ok(())
}

fn render_pretty(period: &PeriodOutput, quiet: bool, w: &mut dyn Write) -> io::Result<()> {
    let report = &period.report;
    pretty_section(w, "Period report")?;
    pretty_kv(w, "Generated", report.generated_at.to_rfc3339())?;
    pretty_kv(
        w,
        "Score",
        format!("{} ({:+})", report.average_score, report.average_score_diff),
    )?;
    pretty_kv(w, "Pages", period.pages.len().to_string())?;
    pretty_kv(w, "Core", &report.environment.core_version)?;
    if quiet {
        return Ok(());
    }

    if !period.changes.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Environment changes")?;
        for change in &period.changes {
            writeln!(w, "  {change}")?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Insights")?;
    if period.insights.is_empty() {
        writeln!(w, "  nothing to report")?;
    }
    for insight in &period.insights {
        let recurring = if insight.recurring { " (again)" } else { "" };
        writeln!(
            w,
            "  [P{}] {}{recurring}",
            insight.priority, insight.message
        )?;
    }
    Ok(())
}
