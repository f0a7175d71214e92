/// Activity event taxonomy - STABLE WIRE SHAPE
///
/// Events serialize as `{"timestamp": ..., "type": ..., "details": {...}}`.
/// The `type` tag set is closed: import, file_operation, network, exception,
/// resource_limit, plus the `error` diagnostic note emitted when a channel
/// record cannot be parsed.
use serde::{Deserialize, Serialize};

/// One observed activity with its offset (seconds) from the owning log's
/// creation instant. Timestamps are monotonic and non-decreasing in
/// emission order within one process.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityEvent {
    pub timestamp: f64,
    #[serde(flatten)]
    pub kind: ActivityKind,
}

/// Tagged event variants and their category-specific details.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum ActivityKind {
    Import {
        module: String,
        allowed: bool,
        reason: String,
    },
    FileOperation {
        operation: String,
        path: String,
        allowed: bool,
        reason: String,
    },
    Network {
        operation: String,
        address: String,
        allowed: bool,
        reason: String,
    },
    Exception {
        exception_type: String,
        message: String,
        traceback: String,
    },
    ResourceLimit {
        limit_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Diagnostic note; lands in the raw timeline only, outside every
    /// category section.
    Error { message: String },
}

impl ActivityKind {
    /// The explicit allow flag for categorized operations, if the variant
    /// carries one.
    pub fn allowed(&self) -> Option<bool> {
        match self {
            ActivityKind::Import { allowed, .. }
            | ActivityKind::FileOperation { allowed, .. }
            | ActivityKind::Network { allowed, .. } => Some(*allowed),
            _ => None,
        }
    }
}
