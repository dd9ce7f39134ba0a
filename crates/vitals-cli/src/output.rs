//! Rendering for every `vitals` command.
//!
//! A command builds one serializable payload and hands it here with a text
//! and a pretty renderer. JSON mode always prints the payload itself, so the
//! JSON contract is the payload type.
//!
//! The mode comes from `vitals_core::config::resolve_output`: `--json`, then
//! `FORMAT=pretty|text|json`, then `output` in the user config, then pretty on
//! a terminal and text when piped.

use serde::Serialize;
use std::io::{self, Write};

use vitals_core::error::ErrorCode;

const RULE_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Sections and aligned columns for a person at a terminal.
    Pretty,
    /// One record per line, tab separated where it helps `cut`/`awk`.
    Text,
    Json,
}

impl OutputMode {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }

    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<14} {}", value.as_ref())
}

/// Print `payload` to stdout in `mode`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    payload: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_payload(mode, payload, &mut stdout, text, pretty)
}

fn write_payload<T: Serialize>(
    mode: OutputMode,
    payload: &T,
    out: &mut dyn Write,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, payload)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(payload, &mut *out)?,
        OutputMode::Pretty => pretty(payload, &mut *out)?,
    }
    out.flush()?;
    Ok(())
}

/// Error shown to the user before a command exits non-zero.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####` from [`ErrorCode::code`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    #[must_use]
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Attach the code and its remediation hint.
    #[must_use]
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
            ..Self::plain(message)
        }
    }
}

/// Print `error` to stderr: `{"error": {...}}` in JSON mode, otherwise
/// `error[E####]: message` with the suggestion indented below.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let mut stderr = io::stderr().lock();
    write_error(mode, error, &mut stderr)
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
        return Ok(());
    }

    match error.error_code.as_deref() {
        Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
        None => writeln!(out, "error: {}", error.message)?,
    }
    if let Some(suggestion) = error.suggestion.as_deref() {
        writeln!(out, "  suggestion: {suggestion}")?;
    }
    Ok(())
}
