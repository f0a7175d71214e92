/// Run-scoped workspace for one execution's artifacts.
///
/// Every child program file, policy document and event channel lives inside
/// a uuid-named directory under the OS temp root, and the whole directory is
/// removed on every exit path. Cleanup is Drop-backed so the guarantee holds
/// across success, failure, timeout and panic unwinding.
use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Result, SandboxError};

pub struct RunWorkspace {
    run_id: String,
    run_dir: PathBuf,
}

impl RunWorkspace {
    /// Create a fresh workspace directory for one run.
    pub fn create() -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = std::env::temp_dir().join(format!("spybox-{}", run_id));

        fs::create_dir_all(&run_dir).map_err(|e| {
            SandboxError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create workspace directory {}: {}",
                    run_dir.display(),
                    e
                ),
            ))
        })?;

        Ok(Self { run_id, run_dir })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Remove the workspace directory (idempotent).
    pub fn cleanup(&self) {
        if self.run_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.run_dir) {
                log::warn!(
                    "Failed to remove workspace {}: {}",
                    self.run_dir.display(),
                    e
                );
            }
        }
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}
