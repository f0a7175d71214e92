//! Activity timeline: events, the append-only log, and the derived report.

pub mod event;
pub mod log;
pub mod report;

pub use event::{ActivityEvent, ActivityKind};
pub use log::ActivityLog;
pub use report::ActivityReport;
