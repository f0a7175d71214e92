/// Aggregated, categorized view of all recorded activity for one execution.
///
/// Read-only derivative of an [`super::log::ActivityLog`]; invariant for the
/// operation categories: `allowed + blocked == total`.
use serde::{Deserialize, Serialize};

use super::event::ActivityEvent;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityReport {
    pub execution_summary: ExecutionSummary,
    pub imports: CategoryReport,
    pub file_operations: CategoryReport,
    pub network_operations: CategoryReport,
    pub exceptions: ExceptionReport,
    pub resource_limits: ResourceLimitReport,
    pub all_activities: Vec<ActivityEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSummary {
    pub duration_seconds: f64,
    pub total_activities: usize,
    pub start_time: String,
    pub end_time: String,
}

/// Totals for one operation category (imports, file, network).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryReport {
    pub total: usize,
    pub allowed: usize,
    pub blocked: usize,
    pub details: Vec<ActivityEvent>,
}

impl CategoryReport {
    pub(crate) fn push(&mut self, event: ActivityEvent) {
        self.total += 1;
        // An event lacking an explicit allowed flag counts as allowed.
        if event.kind.allowed().unwrap_or(true) {
            self.allowed += 1;
        } else {
            self.blocked += 1;
        }
        self.details.push(event);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExceptionReport {
    pub total: usize,
    pub details: Vec<ActivityEvent>,
}

impl ExceptionReport {
    pub(crate) fn push(&mut self, event: ActivityEvent) {
        self.total += 1;
        self.details.push(event);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceLimitReport {
    pub details: Vec<ActivityEvent>,
}

impl ResourceLimitReport {
    pub(crate) fn push(&mut self, event: ActivityEvent) {
        self.details.push(event);
    }
}
