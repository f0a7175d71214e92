/// Post-mortem replay of the child's event channel.
///
/// Runs only after the child has fully terminated, so the channel has
/// exactly one writer (the child, now gone) and one reader (us). Each line
/// is one self-contained record; a record that fails to parse is skipped
/// individually and surfaced as a diagnostic note, never aborting assembly
/// of the remaining records.
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::activity::ActivityLog;

fn default_true() -> bool {
    true
}

fn default_address() -> String {
    "unknown".to_string()
}

/// Wire shape of one channel line, as written by the instrumentation hooks.
/// The child-side timestamp field is ignored; replayed events are re-stamped
/// against the parent log's clock. Records lacking an allowed flag default
/// to allowed.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChannelRecord {
    Import {
        module: String,
        #[serde(default = "default_true")]
        allowed: bool,
        #[serde(default)]
        reason: String,
    },
    FileOperation {
        operation: String,
        path: String,
        #[serde(default = "default_true")]
        allowed: bool,
        #[serde(default)]
        reason: String,
    },
    Network {
        operation: String,
        #[serde(default = "default_address")]
        address: String,
        #[serde(default = "default_true")]
        allowed: bool,
        #[serde(default)]
        reason: String,
    },
    Exception {
        exception_type: String,
        message: String,
        #[serde(default)]
        traceback: String,
    },
}

/// Drain the event channel into the parent's activity log through the same
/// category-specific calls the child used conceptually.
pub fn replay_channel(log: &mut ActivityLog, channel_path: &Path) {
    let contents = match fs::read_to_string(channel_path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!(
                "Failed to read event channel {}: {}",
                channel_path.display(),
                e
            );
            log.log_diagnostic(&format!("Failed to read activity log: {}", e));
            return;
        }
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ChannelRecord>(line) {
            Ok(record) => replay_record(log, record),
            Err(e) => {
                log::warn!("Skipping malformed activity record: {}", e);
                log.log_diagnostic(&format!("Failed to parse activity record: {}", e));
            }
        }
    }
}

fn replay_record(log: &mut ActivityLog, record: ChannelRecord) {
    match record {
        ChannelRecord::Import {
            module,
            allowed,
            reason,
        } => log.log_import(&module, allowed, &reason),
        ChannelRecord::FileOperation {
            operation,
            path,
            allowed,
            reason,
        } => log.log_file_op(&operation, &path, allowed, &reason),
        ChannelRecord::Network {
            operation,
            address,
            allowed,
            reason,
        } => log.log_network(&operation, &address, allowed, &reason),
        ChannelRecord::Exception {
            exception_type,
            message,
            traceback,
        } => log.log_exception(&exception_type, &message, &traceback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn write_channel(lines: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("spybox-channel-test-{}", Uuid::new_v4()));
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn replays_each_record_into_its_category() {
        let path = write_channel(&[
            r#"{"type": "import", "module": "os", "allowed": false, "reason": "Module 'os' is in restricted list", "timestamp": "2026-08-29T10:00:00"}"#,
            r#"{"type": "file_operation", "operation": "write", "path": "x", "allowed": false, "reason": "File write operations are disabled", "timestamp": "2026-08-29T10:00:01"}"#,
            r#"{"type": "network", "operation": "socket_create", "address": "unknown", "allowed": true, "reason": "Allowed", "timestamp": "2026-08-29T10:00:02"}"#,
            r#"{"type": "exception", "exception_type": "ValueError", "message": "boom", "traceback": "Traceback ...", "timestamp": "2026-08-29T10:00:03"}"#,
        ]);

        let mut log = ActivityLog::new();
        replay_channel(&mut log, &path);
        let report = log.build_report();

        assert_eq!(report.imports.total, 1);
        assert_eq!(report.imports.blocked, 1);
        assert_eq!(report.file_operations.total, 1);
        assert_eq!(report.network_operations.total, 1);
        assert_eq!(report.network_operations.allowed, 1);
        assert_eq!(report.exceptions.total, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let path = write_channel(&[
            r#"{"type": "import", "module": "math", "allowed": true, "reason": "Allowed"}"#,
            "not json at all {{{",
            r#"{"type": "wormhole", "module": "zap"}"#,
            r#"{"type": "import", "module": "json", "allowed": true, "reason": "Allowed"}"#,
        ]);

        let mut log = ActivityLog::new();
        replay_channel(&mut log, &path);
        let report = log.build_report();

        // Both well-formed records survive; the two bad lines each leave a
        // diagnostic note in the raw timeline.
        assert_eq!(report.imports.total, 2);
        assert_eq!(report.all_activities.len(), 4);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_allowed_flag_defaults_to_allowed() {
        let path = write_channel(&[
            r#"{"type": "import", "module": "math"}"#,
            r#"{"type": "network", "operation": "socket_create"}"#,
        ]);

        let mut log = ActivityLog::new();
        replay_channel(&mut log, &path);
        let report = log.build_report();

        assert_eq!(report.imports.allowed, 1);
        assert_eq!(report.imports.blocked, 0);
        assert_eq!(report.network_operations.allowed, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_and_blank_lines_are_ignored() {
        let path = write_channel(&[
            "",
            "   ",
            r#"{"type": "import", "module": "math", "allowed": true, "reason": "Allowed"}"#,
            "",
        ]);

        let mut log = ActivityLog::new();
        replay_channel(&mut log, &path);
        assert_eq!(log.build_report().all_activities.len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_channel_file_leaves_one_diagnostic() {
        let path = std::env::temp_dir().join(format!("spybox-missing-{}", Uuid::new_v4()));
        let mut log = ActivityLog::new();
        replay_channel(&mut log, &path);

        let report = log.build_report();
        assert_eq!(report.all_activities.len(), 1);
        assert_eq!(report.imports.total, 0);
    }
}
