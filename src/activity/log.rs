/// Append-only activity log with report aggregation.
///
/// One log per execution; its clock origin is the execution start. Events
/// are stamped with a monotonic offset and are never removed or mutated
/// after appending.
use std::time::{Instant, SystemTime};

use super::event::{ActivityEvent, ActivityKind};
use super::report::{ActivityReport, CategoryReport, ExceptionReport, ExecutionSummary, ResourceLimitReport};

pub struct ActivityLog {
    start_instant: Instant,
    start_time: SystemTime,
    events: Vec<ActivityEvent>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            start_instant: Instant::now(),
            start_time: SystemTime::now(),
            events: Vec::new(),
        }
    }

    fn record(&mut self, kind: ActivityKind) {
        self.events.push(ActivityEvent {
            timestamp: self.start_instant.elapsed().as_secs_f64(),
            kind,
        });
    }

    pub fn log_import(&mut self, module: &str, allowed: bool, reason: &str) {
        self.record(ActivityKind::Import {
            module: module.to_string(),
            allowed,
            reason: reason.to_string(),
        });
    }

    pub fn log_file_op(&mut self, operation: &str, path: &str, allowed: bool, reason: &str) {
        self.record(ActivityKind::FileOperation {
            operation: operation.to_string(),
            path: path.to_string(),
            allowed,
            reason: reason.to_string(),
        });
    }

    pub fn log_network(&mut self, operation: &str, address: &str, allowed: bool, reason: &str) {
        self.record(ActivityKind::Network {
            operation: operation.to_string(),
            address: address.to_string(),
            allowed,
            reason: reason.to_string(),
        });
    }

    pub fn log_exception(&mut self, exception_type: &str, message: &str, traceback: &str) {
        self.record(ActivityKind::Exception {
            exception_type: exception_type.to_string(),
            message: message.to_string(),
            traceback: traceback.to_string(),
        });
    }

    /// A limit that was configured and applied, with its value.
    pub fn log_resource_limit(&mut self, limit_type: &str, value: serde_json::Value) {
        self.record(ActivityKind::ResourceLimit {
            limit_type: limit_type.to_string(),
            value: Some(value),
            error: None,
            message: None,
        });
    }

    /// A limit that could not be applied; non-fatal, execution proceeds.
    pub fn log_resource_limit_error(&mut self, limit_type: &str, error: &str) {
        self.record(ActivityKind::ResourceLimit {
            limit_type: limit_type.to_string(),
            value: None,
            error: Some(error.to_string()),
            message: None,
        });
    }

    /// Platform has no limit controls at all; informational.
    pub fn log_resource_limit_info(&mut self, message: &str) {
        self.record(ActivityKind::ResourceLimit {
            limit_type: "info".to_string(),
            value: None,
            error: None,
            message: Some(message.to_string()),
        });
    }

    /// Diagnostic note (e.g. an unparseable channel record). Appears in the
    /// raw timeline but in no category section.
    pub fn log_diagnostic(&mut self, message: &str) {
        self.record(ActivityKind::Error {
            message: message.to_string(),
        });
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    /// Partition the sequence by tag and compute per-category totals.
    pub fn build_report(&self) -> ActivityReport {
        let end_time = SystemTime::now();
        let duration = self.start_instant.elapsed().as_secs_f64();

        let mut imports = CategoryReport::default();
        let mut file_operations = CategoryReport::default();
        let mut network_operations = CategoryReport::default();
        let mut exceptions = ExceptionReport::default();
        let mut resource_limits = ResourceLimitReport::default();

        for event in &self.events {
            match &event.kind {
                ActivityKind::Import { .. } => imports.push(event.clone()),
                ActivityKind::FileOperation { .. } => file_operations.push(event.clone()),
                ActivityKind::Network { .. } => network_operations.push(event.clone()),
                ActivityKind::Exception { .. } => exceptions.push(event.clone()),
                ActivityKind::ResourceLimit { .. } => resource_limits.push(event.clone()),
                ActivityKind::Error { .. } => {}
            }
        }

        ActivityReport {
            execution_summary: ExecutionSummary {
                duration_seconds: duration,
                total_activities: self.events.len(),
                start_time: iso_timestamp(self.start_time),
                end_time: iso_timestamp(end_time),
            },
            imports,
            file_operations,
            network_operations,
            exceptions,
            resource_limits,
            all_activities: self.events.clone(),
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

fn iso_timestamp(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
