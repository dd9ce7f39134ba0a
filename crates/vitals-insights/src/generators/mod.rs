//! One generator per insight category.
//!
//! Every generator has the [`crate::palette::Generator`] shape: it reads
//! the shared [`crate::context::InsightInputs`] and returns zero or more
//! insights of its own category. Generators never look at mute state.

pub mod diagnostics;
pub mod impact;
pub mod resources;
pub mod score;
pub mod web_vitals;

/// Human-readable byte count (`1.2 MB`, `340 KB`, `512 B`).
pub(crate) fn format_bytes(bytes: f64) -> String {
    let magnitude = bytes.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1} MB", bytes / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.0} KB", bytes / 1_000.0)
    } else {
        format!("{bytes:.0} B")
    }
}

/// Milliseconds as `850 ms` or `2.4 s`.
pub(crate) fn format_millis(millis: f64) -> String {
    if millis.abs() >= 1_000.0 {
        format!("{:.1} s", millis / 1_000.0)
    } else {
        format!("{millis:.0} ms")
    }
}
