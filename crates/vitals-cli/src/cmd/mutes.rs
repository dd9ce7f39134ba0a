//! `vitals mutes`: categories currently silenced and when they lapse.

use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use vitals_core::mute::{MuteRegistry, MuteStore};

use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};

/// Arguments for `vitals mutes`.
#[derive(Args, Debug, Default)]
pub struct MutesArgs {}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ActiveMute {
    #[serde(rename = "type")]
    kind: String,
    muted_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Execute `vitals mutes`.
pub fn run_mutes(_args: &MutesArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let registry = match MuteStore::new(project_root).load() {
        Ok(registry) => registry,
        Err(err) => {
            render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
            anyhow::bail!("mute store unreadable");
        }
    };

    let active = active_mutes(&registry, Utc::now());
    render_mode(
        output,
        &active,
        |active, w| {
            for mute in active {
                writeln!(w, "{}\t{}", mute.kind, mute.expires_at.to_rfc3339())?;
            }
            Ok(())
        },
        |active, w| {
            pretty_section(w, "Active mutes")?;
            if active.is_empty() {
                writeln!(w, "  none")?;
            }
            for mute in active {
                writeln!(
                    w,
                    "  {:<22} until {}",
                    mute.kind,
                    mute.expires_at.format("%Y-%m-%d %H:%M UTC")
                )?;
            }
            Ok(())
        },
    )
}

fn active_mutes(registry: &MuteRegistry, now: DateTime<Utc>) -> Vec<ActiveMute> {
    registry
        .entries()
        .filter(|(kind, _)| registry.is_muted(kind, now))
        .filter_map(|(kind, muted_at)| {
            Some(ActiveMute {
                kind: kind.to_string(),
                muted_at,
                expires_at: registry.expires_at(kind)?,
            })
        })
        .collect()
}
