//! Policy configuration and decision functions.
//!
//! A [`PolicyConfig`] is an immutable per-execution ruleset. Its decision
//! functions classify an attempted operation as allowed or blocked and always
//! produce a human-readable reason; a policy decision is never an error.
//!
//! Precedence order, reproduced exactly for every category:
//! allow-list → restrict-list / blanket boolean → heuristic pattern →
//! default-allow. An entry present in an allow-list wins unconditionally.

use serde::{Deserialize, Serialize};

/// Module name substrings that indicate process, host or network reach.
/// Matched case-insensitively after the allow/restrict lists have had
/// their say.
pub const DANGEROUS_PATTERNS: &[&str] = &[
    "subprocess",
    "os.",
    "sys.",
    "socket",
    "urllib",
    "http",
    "ftplib",
    "smtplib",
];

fn default_timeout() -> f64 {
    10.0
}

fn default_memory_limit() -> u64 {
    128
}

fn default_cpu_limit() -> f64 {
    50.0
}

fn default_restricted_imports() -> Vec<String> {
    ["os", "sys", "subprocess", "shutil", "socket", "urllib"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Immutable ruleset governing which operations are permitted.
///
/// Created fresh per execution; the supervisor serializes it into the child's
/// policy file so both sides resolve decisions from the same document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Wall-clock ceiling for the child process, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Address-space ceiling for the child process, in megabytes
    #[serde(default = "default_memory_limit")]
    pub memory_limit_mb: u64,
    /// Informational only; no scheduler-level enforcement exists
    #[serde(default = "default_cpu_limit")]
    pub cpu_limit_percent: f64,
    /// Blanket permission for read-mode file opens
    #[serde(default)]
    pub allow_file_read: bool,
    /// Blanket permission for write/append-mode file opens
    #[serde(default)]
    pub allow_file_write: bool,
    /// Blanket permission for socket construction
    #[serde(default)]
    pub allow_network: bool,
    /// Module names blocked by name
    #[serde(default = "default_restricted_imports")]
    pub restricted_imports: Vec<String>,
    /// Module names permitted unconditionally (overrides everything)
    #[serde(default)]
    pub allowed_imports: Vec<String>,
    /// Path prefixes permitted unconditionally (overrides the booleans)
    #[serde(default)]
    pub allowed_file_paths: Vec<String>,
    /// Address prefixes permitted unconditionally (overrides the boolean)
    #[serde(default)]
    pub allowed_network_addresses: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            memory_limit_mb: default_memory_limit(),
            cpu_limit_percent: default_cpu_limit(),
            allow_file_read: false,
            allow_file_write: false,
            allow_network: false,
            restricted_imports: default_restricted_imports(),
            allowed_imports: Vec::new(),
            allowed_file_paths: Vec::new(),
            allowed_network_addresses: Vec::new(),
        }
    }
}

/// Outcome of a single policy decision: never an error, always a verdict
/// with a reason suitable for the activity report.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: String,
}

impl PolicyDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    fn block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// File access class for a single open attempt. Each open resolves to
/// exactly one class before the policy is consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileAccess {
    Read,
    Write,
    Append,
}

impl FileAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAccess::Read => "read",
            FileAccess::Write => "write",
            FileAccess::Append => "append",
        }
    }
}

impl std::fmt::Display for FileAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PolicyConfig {
    /// Validate configuration bounds before an execution is attempted.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(crate::error::SandboxError::Config(format!(
                "timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }
        if self.memory_limit_mb == 0 {
            return Err(crate::error::SandboxError::Config(
                "memory_limit_mb must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Decide an import attempt.
    pub fn decide_import(&self, module_name: &str) -> PolicyDecision {
        // Allow-list wins over the restricted list and the patterns.
        if self.allowed_imports.iter().any(|m| m == module_name) {
            return PolicyDecision::allow("Explicitly allowed (overrides restriction)");
        }

        if self.restricted_imports.iter().any(|m| m == module_name) {
            return PolicyDecision::block(format!(
                "Module '{}' is in restricted list",
                module_name
            ));
        }

        let lowered = module_name.to_lowercase();
        for pattern in DANGEROUS_PATTERNS {
            if lowered.contains(pattern) {
                return PolicyDecision::block(format!(
                    "Module '{}' matches dangerous pattern '{}'",
                    module_name, pattern
                ));
            }
        }

        PolicyDecision::allow("Allowed")
    }

    /// Decide a file open attempt for the given access class.
    pub fn decide_file_path(&self, path: &str, access: FileAccess) -> PolicyDecision {
        let normalized = normalize_path(path);
        for allowed_path in &self.allowed_file_paths {
            let prefix = normalize_path(allowed_path);
            if normalized == prefix || normalized.starts_with(&format!("{}/", prefix)) {
                return PolicyDecision::allow(format!(
                    "File path '{}' is explicitly allowed",
                    path
                ));
            }
        }

        match access {
            FileAccess::Read if !self.allow_file_read => {
                PolicyDecision::block("File read operations are disabled")
            }
            FileAccess::Write | FileAccess::Append if !self.allow_file_write => {
                PolicyDecision::block("File write operations are disabled")
            }
            _ => PolicyDecision::allow("Allowed"),
        }
    }

    /// Decide a network attempt against an address that may still be
    /// unresolved ("unknown" at socket-construction time).
    pub fn decide_network(&self, address: &str) -> PolicyDecision {
        for allowed_addr in &self.allowed_network_addresses {
            if address == allowed_addr || address.starts_with(allowed_addr.as_str()) {
                return PolicyDecision::allow(format!(
                    "Network address '{}' is explicitly allowed",
                    address
                ));
            }
        }

        if !self.allow_network {
            return PolicyDecision::block("Network operations are disabled");
        }

        PolicyDecision::allow("Allowed")
    }
}

/// Lexical path normalization: collapses `.`, `..` and repeated separators
/// without touching the filesystem, mirroring what the child-side hook does.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if let Some(last) = parts.last() {
                    if *last != ".." {
                        parts.pop();
                        continue;
                    }
                }
                // Above an absolute root ".." collapses; relative paths keep it.
                if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
