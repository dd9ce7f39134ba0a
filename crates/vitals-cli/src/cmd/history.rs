//! `vitals history`: paginated feed of recorded periods, newest first.

use std::path::Path;

use clap::Args;
use serde::Serialize;

use vitals_insights::PeriodOutput;

use crate::output::{CliError, OutputMode, pretty_rule, pretty_section, render_error, render_mode};
use crate::state;

/// Arguments for `vitals history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of periods to show.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Number of newer periods to skip.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Debug, Serialize)]
struct HistoryFeed {
    total: usize,
    offset: usize,
    limit: usize,
    periods: Vec<PeriodOutput>,
}

/// Execute `vitals history`.
pub fn run_history(args: &HistoryArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let page = match state::load_history(project_root, args.offset, args.limit) {
        Ok(page) => page,
        Err(err) => {
            render_error(
                output,
                &CliError::plain(format!("{err:#}")),
            )?;
            anyhow::bail!("history unreadable");
        }
    };

    let feed = HistoryFeed {
        total: page.total,
        offset: args.offset,
        limit: args.limit,
        periods: page.periods,
    };

    render_mode(
        output,
        &feed,
        |feed, w| {
            for period in &feed.periods {
                let report = &period.report;
                writeln!(
                    w,
                    "{}\tscore={}\tdiff={:+}\tchanges={}\tinsights={}",
                    report.generated_at.to_rfc3339(),
                    report.average_score,
                    report.average_score_diff,
                    report.changes,
                    report.insights
                )?;
            }
            Ok(())
        },
        |feed, w| {
            pretty_section(
                w,
                &format!(
                    "History ({} of {} periods)",
                    feed.periods.len(),
                    feed.total
                ),
            )?;
            for period in &feed.periods {
                let report = &period.report;
                writeln!(
                    w,
                    "  {}  score {:>3} ({:+})  {} changes  {} insights",
                    report.generated_at.format("%Y-%m-%d %H:%M"),
                    report.average_score,
                    report.average_score_diff,
                    report.changes,
                    report.insights
                )?;
                for change in &period.changes {
                    writeln!(w, "      {change}")?;
                }
            }
            if feed.offset + feed.periods.len() < feed.total {
                pretty_rule(w)?;
                writeln!(
                    w,
                    "  more: vitals history --offset {}",
                    feed.offset + feed.periods.len()
                )?;
            }
            Ok(())
        },
    )
}
