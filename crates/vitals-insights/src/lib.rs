#![forbid(unsafe_code)]
//! vitals-insights library.
//!
//! Prioritized, individually mutable insight generation over the records
//! produced by `vitals-core`, and the per-period pipeline that wires every
//! stage together.
//!
//! # Conventions
//!
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Purity**: generators only read [`context::InsightInputs`]; mute state
//!   is applied by the [`orchestrator::InsightOrchestrator`].

pub mod context;
pub mod generators;
pub mod insight;
pub mod orchestrator;
pub mod palette;
pub mod pipeline;

pub use context::InsightInputs;
pub use insight::{Insight, InsightKind};
pub use orchestrator::InsightOrchestrator;
pub use palette::{CategoryInfo, PALETTE, PaletteEntry, palette};
pub use pipeline::{PeriodInput, PeriodOutput, run_period};
