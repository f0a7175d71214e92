/// Process supervision: launch, bounded wait, forced termination.
///
/// The supervisor is single-threaded and blocking; the bounded wait on the
/// child is the only suspension point in the core. Nothing propagates an
/// unhandled fault past [`Supervisor::run`]: every failure mode maps to a
/// well-formed [`ExecutionResult`].
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityLog, ActivityReport};
use crate::error::{Result, SandboxError};
use crate::exec::limits::LimitPlan;
use crate::exec::workspace::RunWorkspace;
use crate::instrument::InstrumentedProgram;
use crate::policy::PolicyConfig;
use crate::report::assembler;

/// Interpreter used when the caller does not override it.
pub const DEFAULT_PYTHON: &str = "python3";

/// Poll interval for the bounded wait loop.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Final outcome of one supervised execution.
///
/// `return_code` -1 is reserved for "killed by timeout" and for
/// supervisor-level failure before the child produced output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
    pub execution_time: f64,
    pub report: ActivityReport,
}

/// One-shot supervisor bound to a policy configuration.
pub struct Supervisor {
    config: PolicyConfig,
    python: String,
}

impl Supervisor {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            python: DEFAULT_PYTHON.to_string(),
        }
    }

    /// Override the interpreter executable (path or name on PATH).
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Execute a code fragment under supervision and return its output
    /// together with the assembled activity report. Infallible by contract.
    pub fn run(&self, code: &str, input: Option<&str>) -> ExecutionResult {
        let started = Instant::now();
        let mut log = ActivityLog::new();

        match self.run_inner(code, input, &mut log, started) {
            Ok(result) => result,
            Err(e) => {
                log::error!("supervisor failure: {}", e);
                log.log_exception("SupervisorError", &e.to_string(), "");
                ExecutionResult {
                    success: false,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    return_code: -1,
                    execution_time: started.elapsed().as_secs_f64(),
                    report: log.build_report(),
                }
            }
        }
    }

    fn run_inner(
        &self,
        code: &str,
        input: Option<&str>,
        log: &mut ActivityLog,
        started: Instant,
    ) -> Result<ExecutionResult> {
        self.config.validate()?;

        let workspace = RunWorkspace::create()?;
        let program = InstrumentedProgram::materialize(workspace.run_dir(), code, &self.config)?;
        let plan = LimitPlan::prepare(&self.config);

        let [wrapper, policy, payload, channel] = program.argv();
        let mut command = Command::new(&self.python);
        command
            .arg(wrapper)
            .arg(policy)
            .arg(payload)
            .arg(channel)
            .current_dir(workspace.run_dir())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        plan.apply(&mut command);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                // No child ever existed: short-circuit with the failure text
                // as stderr and skip report assembly entirely.
                let message = format!("Failed to launch {}: {}", self.python, e);
                log::warn!("{}", message);
                log.log_exception("LaunchError", &message, "");
                return Ok(ExecutionResult {
                    success: false,
                    stdout: String::new(),
                    stderr: message,
                    return_code: -1,
                    execution_time: started.elapsed().as_secs_f64(),
                    report: log.build_report(),
                });
            }
        };
        log::debug!(
            "run {} launched pid {} ({})",
            workspace.run_id(),
            child.id(),
            self.python
        );

        plan.record(log);

        // Fed from its own thread: a child that never drains stdin would
        // otherwise block the supervisor here once the pipe buffer fills,
        // and the deadline below must stay in charge. Killing the child
        // closes the read end and unblocks the writer with EPIPE.
        let stdin_writer = match (input, child.stdin.take()) {
            (Some(data), Some(mut stdin)) => {
                let data = data.as_bytes().to_vec();
                Some(thread::spawn(move || {
                    // Dropping the handle closes the pipe so the child sees EOF.
                    let _ = stdin.write_all(&data);
                }))
            }
            _ => None,
        };

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let deadline = Duration::from_secs_f64(self.config.timeout_seconds);
        let mut timed_out = false;
        let exit_code = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status.code().unwrap_or(-1),
                Ok(None) => {
                    if started.elapsed() > deadline {
                        timed_out = true;
                        let _ = child.kill();
                        let _ = child.wait();
                        break -1;
                    }
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SandboxError::Process(format!("wait(child): {}", e)));
                }
            }
        };

        // Readers hit EOF and the writer gets EPIPE once the child (and its
        // pipe ends) are gone.
        if let Some(writer) = stdin_writer {
            let _ = writer.join();
        }
        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        if timed_out {
            log::info!(
                "run {} exceeded {}s wall-clock limit, killed",
                workspace.run_id(),
                self.config.timeout_seconds
            );
            log.log_exception(
                "TimeoutError",
                &format!(
                    "Execution exceeded timeout of {} seconds",
                    self.config.timeout_seconds
                ),
                "",
            );
        }

        // The child has fully terminated; the channel has no writer left.
        assembler::replay_channel(log, &program.channel_path);

        Ok(ExecutionResult {
            success: exit_code == 0,
            stdout,
            stderr,
            return_code: exit_code,
            execution_time: started.elapsed().as_secs_f64(),
            report: log.build_report(),
        })
    }
}

/// Execute with a one-off supervisor and the default interpreter.
pub fn run_sandboxed_code(
    code: &str,
    config: &PolicyConfig,
    input: Option<&str>,
) -> ExecutionResult {
    Supervisor::new(config.clone()).run(code, input)
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: Option<R>,
) -> Option<thread::JoinHandle<Vec<u8>>> {
    stream.map(|mut stream| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stream.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
