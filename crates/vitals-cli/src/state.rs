//! Period state under `.vitals/`: the latest output, read back as the
//! previous period on the next run, and an append-only history feed.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use vitals_core::config::vitals_dir;
use vitals_core::lock::{DEFAULT_LOCK_TIMEOUT, StateLock};
use vitals_insights::PeriodOutput;

fn latest_path(project_root: &Path) -> PathBuf {
    vitals_dir(project_root).join("latest.json")
}

fn history_path(project_root: &Path) -> PathBuf {
    vitals_dir(project_root).join("history.jsonl")
}

fn lock_path(project_root: &Path) -> PathBuf {
    vitals_dir(project_root).join("state.lock")
}

/// Load the most recent period, if one has been recorded.
pub fn load_latest(project_root: &Path) -> Result<Option<PeriodOutput>> {
    let path = latest_path(project_root);
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let output = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(output))
}

/// Record a finished period: replace `latest.json` and append to the feed.
pub fn save_period(project_root: &Path, output: &PeriodOutput) -> Result<()> {
    let lock = StateLock::acquire(&lock_path(project_root), DEFAULT_LOCK_TIMEOUT)?;

    let path = latest_path(project_root);
    let tmp_path = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(output).context("failed to serialize period output")?;
    fs::write(&tmp_path, body)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, &path).with_context(|| {
        format!(
            "failed to atomically move {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    let log_path = history_path(project_root);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;
    serde_json::to_writer(&mut file, output)
        .with_context(|| format!("failed to serialize period to {}", log_path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to append newline to {}", log_path.display()))?;
    file.flush()
        .with_context(|| format!("failed to flush {}", log_path.display()))?;

    lock.release();
    Ok(())
}

/// One page of the history feed, newest first.
#[derive(Debug)]
pub struct HistoryPage {
    pub total: usize,
    pub periods: Vec<PeriodOutput>,
}

/// Read `limit` periods from the feed, newest first, skipping `offset`.
///
/// Lines that fail to parse are skipped with a warning.
pub fn load_history(project_root: &Path, offset: usize, limit: usize) -> Result<HistoryPage> {
    let path = history_path(project_root);
    if !path.exists() {
        return Ok(HistoryPage {
            total: 0,
            periods: Vec::new(),
        });
    }

    let file = fs::File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut periods = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed reading line {} in {}", line_no + 1, path.display())
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PeriodOutput>(&line) {
            Ok(period) => periods.push(period),
            Err(err) => warn!(line = line_no + 1, %err, "skipping unreadable history entry"),
        }
    }

    let total = periods.len();
    let periods = periods.into_iter().rev().skip(offset).take(limit).collect();
    Ok(HistoryPage { total, periods })
}
