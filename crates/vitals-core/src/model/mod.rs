//! Input and derived record types.

pub mod audit;
pub mod change;
pub mod environment;
pub mod metric;
pub mod page;
pub mod report;

pub use audit::{AuditSummary, Diagnostics, LargeFile, RawAudit, ResourceHit, ThirdPartyHit};
pub use change::{ChangeAction, ChangeEvent, ChangeSubject, ObjectType};
pub use environment::{EnvironmentSnapshot, Package};
pub use metric::Metric;
pub use page::PageRecord;
pub use report::ReportRecord;
