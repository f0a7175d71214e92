//! Command-line adapter.
//!
//! Builds a [`PolicyConfig`] from flags, reads the script and optional stdin
//! payload, invokes the core, and relays its structured result: stdout and
//! stderr are echoed, the report is saved as JSON or summarized on stderr.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::exec::{Supervisor, DEFAULT_PYTHON};
use crate::policy::PolicyConfig;
use crate::report::printer;

#[derive(Parser, Debug)]
#[command(
    name = "spybox",
    author,
    version,
    about = "Execute an untrusted Python script and report every import, file and network attempt"
)]
pub struct Cli {
    /// Path to the Python script to execute
    pub script: PathBuf,

    /// Execution timeout in seconds
    #[arg(long, default_value_t = 10.0)]
    pub timeout: f64,

    /// Memory limit in MB
    #[arg(long, default_value_t = 128)]
    pub memory: u64,

    /// CPU limit percentage (informational only)
    #[arg(long, default_value_t = 50.0)]
    pub cpu: f64,

    /// Allow file read operations
    #[arg(long)]
    pub allow_file_read: bool,

    /// Allow file write operations
    #[arg(long)]
    pub allow_file_write: bool,

    /// Allow network operations
    #[arg(long)]
    pub allow_network: bool,

    /// Restricted module names (replaces the default list)
    #[arg(long, num_args = 1.., value_name = "MODULE")]
    pub restricted_imports: Option<Vec<String>>,

    /// Allowed module names (override restrictions)
    #[arg(long, num_args = 1.., value_name = "MODULE")]
    pub allowed_imports: Option<Vec<String>>,

    /// Allowed file path prefixes (override file restrictions)
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub allowed_file_paths: Option<Vec<String>>,

    /// Allowed network address prefixes (override network restrictions)
    #[arg(long, num_args = 1.., value_name = "ADDR")]
    pub allowed_network_addresses: Option<Vec<String>>,

    /// Save the JSON report to this path instead of printing a summary
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Read stdin payload for the script from this file
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Python interpreter to launch
    #[arg(long, default_value = DEFAULT_PYTHON)]
    pub python: String,
}

impl Cli {
    pub fn to_policy(&self) -> PolicyConfig {
        let defaults = PolicyConfig::default();
        PolicyConfig {
            timeout_seconds: self.timeout,
            memory_limit_mb: self.memory,
            cpu_limit_percent: self.cpu,
            allow_file_read: self.allow_file_read,
            allow_file_write: self.allow_file_write,
            allow_network: self.allow_network,
            restricted_imports: self
                .restricted_imports
                .clone()
                .unwrap_or(defaults.restricted_imports),
            allowed_imports: self.allowed_imports.clone().unwrap_or_default(),
            allowed_file_paths: self.allowed_file_paths.clone().unwrap_or_default(),
            allowed_network_addresses: self
                .allowed_network_addresses
                .clone()
                .unwrap_or_default(),
        }
    }
}

/// Parse argv, run the sandbox, relay the result. Returns the process exit
/// code: 0 when the fragment succeeded, 1 otherwise.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    run_with(cli)
}

pub fn run_with(cli: Cli) -> Result<i32> {
    let code = fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read script {}", cli.script.display()))?;

    let input = match &cli.input {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?,
        ),
        None => None,
    };

    let config = cli.to_policy();
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    let result = Supervisor::new(config)
        .with_python(&cli.python)
        .run(&code, input.as_deref());

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    if !result.stdout.is_empty() {
        write!(stdout.lock(), "{}", result.stdout)?;
    }
    if !result.stderr.is_empty() {
        write!(stderr.lock(), "{}", result.stderr)?;
    }

    match &cli.report {
        Some(path) => {
            let json = serde_json::to_string_pretty(&result.report)?;
            fs::write(path, json)
                .with_context(|| format!("failed to save report to {}", path.display()))?;
            writeln!(stderr.lock(), "\nReport saved to {}", path.display())?;
        }
        None => {
            let mut err = stderr.lock();
            writeln!(err)?;
            printer::print_summary(&result.report, &mut err)?;
        }
    }

    Ok(if result.success { 0 } else { 1 })
}
