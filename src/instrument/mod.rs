//! Child-program instrumentation.
//!
//! The instrumentation entry point is a fixed template; the caller's code and
//! the serialized policy are separate artifacts. The three are joined only at
//! the process-launch boundary, via argv, never by splicing user source into
//! generated program text.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::policy::PolicyConfig;

/// Fixed instrumentation entry point executed by the child interpreter.
pub const WRAPPER_SOURCE: &str = include_str!("wrapper.py");

/// File names materialized inside a run workspace.
pub const WRAPPER_FILE: &str = "wrapper.py";
pub const POLICY_FILE: &str = "policy.json";
pub const PAYLOAD_FILE: &str = "payload.py";
pub const CHANNEL_FILE: &str = "activity.log";

/// The artifacts of one instrumented execution, all inside the run
/// directory and removed with it.
#[derive(Clone, Debug)]
pub struct InstrumentedProgram {
    pub wrapper_path: PathBuf,
    pub policy_path: PathBuf,
    pub payload_path: PathBuf,
    pub channel_path: PathBuf,
}

impl InstrumentedProgram {
    /// Write the wrapper, policy document, payload and an empty event
    /// channel into `run_dir`.
    pub fn materialize(run_dir: &Path, code: &str, config: &PolicyConfig) -> Result<Self> {
        let wrapper_path = run_dir.join(WRAPPER_FILE);
        let policy_path = run_dir.join(POLICY_FILE);
        let payload_path = run_dir.join(PAYLOAD_FILE);
        let channel_path = run_dir.join(CHANNEL_FILE);

        fs::write(&wrapper_path, WRAPPER_SOURCE)?;
        fs::write(&policy_path, serde_json::to_string_pretty(config)?)?;
        fs::write(&payload_path, code)?;
        fs::write(&channel_path, b"")?;

        Ok(Self {
            wrapper_path,
            policy_path,
            payload_path,
            channel_path,
        })
    }

    /// argv for the child interpreter, in the order the wrapper expects.
    pub fn argv(&self) -> [&Path; 4] {
        [
            self.wrapper_path.as_path(),
            self.policy_path.as_path(),
            self.payload_path.as_path(),
            self.channel_path.as_path(),
        ]
    }
}
