//! spybox: observed execution of untrusted Python fragments
//!
//! Runs a caller-supplied code fragment in a child OS process, observes every
//! import, file-open and socket-construction attempt it makes, applies a
//! precedence-ordered policy to each attempt, and returns the fragment's
//! output together with a structured activity report.
//!
//! Enforcement is advisory by design: every decision is computed, recorded
//! and (when blocked) warned about on the child's stderr, and the underlying
//! operation then proceeds regardless. The product of a run is the activity
//! timeline, not a security boundary.
//!
//! # Architecture
//!
//! ## Policy ([`policy`])
//! - [`policy::PolicyConfig`]: immutable per-execution ruleset with pure
//!   decision functions for imports, file paths and network addresses
//!
//! ## Activity ([`activity`])
//! - [`activity::ActivityLog`]: append-only timestamped event sequence
//! - [`activity::ActivityReport`]: categorized aggregate with per-category
//!   allowed/blocked totals
//!
//! ## Instrumentation ([`instrument`])
//! - fixed child entry point plus separate payload and policy artifacts,
//!   joined only at the process-launch boundary via argv
//!
//! ## Execution Control ([`exec`])
//! - [`exec::Supervisor`]: launch, bounded wait, forced termination
//! - [`exec::LimitPlan`]: capability-queried best-effort resource ceilings
//! - [`exec::RunWorkspace`]: run-scoped artifacts with Drop-backed cleanup
//!
//! ## Report ([`report`])
//! - [`report::assembler`]: post-mortem replay of the child's event channel
//! - [`report::printer`]: human-readable summary and detail views
//!
//! ## Adapters
//! - [`cli`]: flag parsing and result relay for the `spybox` binary
//! - [`server`]: JSON-over-HTTP surface for the `spybox-serve` binary
//!
//! # Design Principles
//!
//! 1. **Advisory, faithfully** - decisions are logged and warned, never
//!    enforced; the limitation is part of the contract
//! 2. **Evidence over inference** - the report is assembled from records the
//!    child actually wrote, merged with supervisor-observed events
//! 3. **Post-mortem reads only** - the event channel is drained after the
//!    child has fully terminated; one writer, one reader, no races
//! 4. **Every failure is a result** - nothing propagates an unhandled fault
//!    past the supervisor

pub mod activity;
pub mod cli;
pub mod error;
pub mod exec;
pub mod instrument;
pub mod policy;
pub mod report;
pub mod server;

pub use activity::{ActivityEvent, ActivityKind, ActivityLog, ActivityReport};
pub use error::{Result, SandboxError};
pub use exec::{run_sandboxed_code, ExecutionResult, Supervisor};
pub use policy::{FileAccess, PolicyConfig, PolicyDecision};
