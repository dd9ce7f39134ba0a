//! `vitals palette`: insight categories in the order they are reported.


use clap::Args;

use vitals_insights::InsightOrchestrator;

use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `vitals palette`.
#[derive(Args, Debug, Default)]
pub struct PaletteArgs {}

/// Execute `vitals palette`.
pub fn run_palette(_args: &PaletteArgs, output: OutputMode) -> anyhow::Result<()> {
    let categories = InsightOrchestrator::default().categories();
    render_mode(
        output,
        &categories,
        |categories, w| {
            for category in categories {
                writeln!(w, "{}\t{}\t{}", category.priority, category.kind, category.label)?;
            }
            Ok(())
        },
        |categories, w| {
            pretty_section(w, "Insight palette")?;
            for category in categories {
                writeln!(
                    w,
                    "  P{}  {:<22} {}",
                    category.priority,
                    category.kind.key(),
                    category.label
                )?;
            }
            Ok(())
        },
    )
}
