//! Execution control: run workspace, resource ceilings, process supervision.

pub mod limits;
pub mod supervisor;
pub mod workspace;

pub use limits::{LimitCapability, LimitPlan};
pub use supervisor::{run_sandboxed_code, ExecutionResult, Supervisor, DEFAULT_PYTHON};
pub use workspace::RunWorkspace;
