#![forbid(unsafe_code)]
//! vitals-core library.
//!
//! Turns raw page audits and environment inventories into page records,
//! period reports and change events, and owns the mute registry that gates
//! insight generation.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module seams, `anyhow::Result` for file glue.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod changes;
pub mod config;
pub mod error;
pub mod lenient;
pub mod lock;
pub mod model;
pub mod mute;
pub mod page;
pub mod report;
pub mod source;
pub mod version;
