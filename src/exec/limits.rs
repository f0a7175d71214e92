/// Best-effort resource ceilings for the child process.
///
/// Limit support is a capability queried once, not a runtime exception
/// caught opportunistically: the plan is prepared and recorded before the
/// child is spawned, and platforms without controls record an informational
/// event and proceed without enforcement.
use std::process::Command;

use crate::activity::ActivityLog;
use crate::policy::PolicyConfig;

/// What the host platform can enforce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitCapability {
    /// POSIX rlimits applied between fork and exec.
    Rlimit,
    /// No process resource controls on this platform.
    Unsupported,
}

impl LimitCapability {
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            LimitCapability::Rlimit
        }
        #[cfg(not(unix))]
        {
            LimitCapability::Unsupported
        }
    }
}

/// Prepared limit values plus any preparation failures. Failures are
/// recorded as non-fatal resource_limit events; execution proceeds without
/// the affected limit.
#[derive(Clone, Debug)]
pub struct LimitPlan {
    capability: LimitCapability,
    memory_limit_mb: u64,
    address_space_bytes: Option<u64>,
    cpu_time_seconds: Option<u64>,
    errors: Vec<(String, String)>,
}

impl LimitPlan {
    pub fn prepare(config: &PolicyConfig) -> Self {
        let capability = LimitCapability::detect();
        let mut errors = Vec::new();

        let address_space_bytes = match config.memory_limit_mb.checked_mul(1024 * 1024) {
            Some(bytes) => Some(bytes),
            None => {
                errors.push((
                    "memory".to_string(),
                    format!(
                        "memory_limit_mb {} overflows the address-space cap",
                        config.memory_limit_mb
                    ),
                ));
                None
            }
        };

        // CPU seconds sit one above the wall-clock ceiling so the supervisor
        // timeout stays the deciding authority for CPU-bound payloads.
        let cpu_time_seconds = if config.timeout_seconds.is_finite() {
            Some(config.timeout_seconds.ceil() as u64 + 1)
        } else {
            errors.push((
                "cpu".to_string(),
                format!("timeout_seconds {} is not finite", config.timeout_seconds),
            ));
            None
        };

        Self {
            capability,
            memory_limit_mb: config.memory_limit_mb,
            address_space_bytes,
            cpu_time_seconds,
            errors,
        }
    }

    pub fn capability(&self) -> LimitCapability {
        self.capability
    }

    /// Record what was configured (or why it could not be) into the
    /// supervisor-side activity log.
    pub fn record(&self, log: &mut ActivityLog) {
        if self.capability == LimitCapability::Unsupported {
            log.log_resource_limit_info("Resource limits not available on this platform");
            return;
        }

        if self.address_space_bytes.is_some() {
            log.log_resource_limit("memory_mb", serde_json::json!(self.memory_limit_mb));
        }
        if let Some(cpu) = self.cpu_time_seconds {
            log.log_resource_limit("cpu_time_seconds", serde_json::json!(cpu));
        }
        for (limit_type, error) in &self.errors {
            log.log_resource_limit_error(limit_type, error);
        }
    }

    /// Install the pre-exec hook that applies the ceilings in the child
    /// between fork and exec. Application is best-effort; a failed setrlimit
    /// must not abort the launch.
    pub fn apply(&self, command: &mut Command) {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            if self.capability != LimitCapability::Rlimit {
                return;
            }
            let address_space = self.address_space_bytes;
            let cpu_seconds = self.cpu_time_seconds;

            unsafe {
                command.pre_exec(move || {
                    if let Some(bytes) = address_space {
                        set_rlimit(libc::RLIMIT_AS, bytes);
                    }
                    if let Some(seconds) = cpu_seconds {
                        set_rlimit(libc::RLIMIT_CPU, seconds);
                    }
                    Ok(())
                });
            }
        }
        #[cfg(not(unix))]
        {
            let _ = command;
        }
    }
}

#[cfg(all(unix, target_env = "gnu"))]
type RlimitResource = libc::__rlimit_resource_t;
#[cfg(all(unix, not(target_env = "gnu")))]
type RlimitResource = libc::c_int;

#[cfg(unix)]
fn set_rlimit(resource: RlimitResource, value: u64) {
    let limit = libc::rlimit {
        rlim_cur: value as libc::rlim_t,
        rlim_max: value as libc::rlim_t,
    };
    // Best-effort: between fork and exec there is no channel to report a
    // failure, and a missing ceiling is advisory-compatible.
    unsafe {
        let _ = libc::setrlimit(resource, &limit);
    }
}
