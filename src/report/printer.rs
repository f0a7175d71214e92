/// Human-readable rendering of an activity report.
///
/// External collaborator of the core: consumes the structured report, never
/// influences it.
use std::io::{self, Write};

use crate::activity::event::ActivityKind;
use crate::activity::ActivityReport;

/// Short stderr banner printed after a CLI run without `--report`.
pub fn print_summary(report: &ActivityReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "SANDBOX ACTIVITY REPORT")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(
        out,
        "Execution time: {:.2}s",
        report.execution_summary.duration_seconds
    )?;
    writeln!(
        out,
        "Total activities: {}",
        report.execution_summary.total_activities
    )?;
    writeln!(
        out,
        "Imports: {} (allowed: {}, blocked: {})",
        report.imports.total, report.imports.allowed, report.imports.blocked
    )?;
    writeln!(
        out,
        "File operations: {} (allowed: {}, blocked: {})",
        report.file_operations.total,
        report.file_operations.allowed,
        report.file_operations.blocked
    )?;
    writeln!(
        out,
        "Network operations: {} (allowed: {}, blocked: {})",
        report.network_operations.total,
        report.network_operations.allowed,
        report.network_operations.blocked
    )?;
    writeln!(out, "Exceptions: {}", report.exceptions.total)?;
    writeln!(out, "{}", "=".repeat(60))?;
    Ok(())
}

/// Full detail view with per-entry verdicts and blocked reasons.
pub fn print_detailed(report: &ActivityReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "DETAILED SANDBOX ACTIVITY REPORT")?;
    writeln!(out, "{}", "=".repeat(60))?;

    let summary = &report.execution_summary;
    writeln!(out, "\nExecution Summary:")?;
    writeln!(out, "  Duration: {:.3} seconds", summary.duration_seconds)?;
    writeln!(out, "  Start: {}", summary.start_time)?;
    writeln!(out, "  End: {}", summary.end_time)?;
    writeln!(out, "  Total Activities: {}", summary.total_activities)?;

    writeln!(out, "\nImports ({} total):", report.imports.total)?;
    writeln!(out, "  Allowed: {}", report.imports.allowed)?;
    writeln!(out, "  Blocked: {}", report.imports.blocked)?;
    for event in &report.imports.details {
        if let ActivityKind::Import {
            module,
            allowed,
            reason,
        } = &event.kind
        {
            writeln!(out, "    {}: {}", verdict_label(*allowed), module)?;
            if !allowed {
                writeln!(out, "      Reason: {}", reason)?;
            }
        }
    }

    writeln!(
        out,
        "\nFile Operations ({} total):",
        report.file_operations.total
    )?;
    writeln!(out, "  Allowed: {}", report.file_operations.allowed)?;
    writeln!(out, "  Blocked: {}", report.file_operations.blocked)?;
    for event in &report.file_operations.details {
        if let ActivityKind::FileOperation {
            operation,
            path,
            allowed,
            reason,
        } = &event.kind
        {
            writeln!(
                out,
                "    {}: {} on {}",
                verdict_label(*allowed),
                operation,
                path
            )?;
            if !allowed {
                writeln!(out, "      Reason: {}", reason)?;
            }
        }
    }

    writeln!(
        out,
        "\nNetwork Operations ({} total):",
        report.network_operations.total
    )?;
    writeln!(out, "  Allowed: {}", report.network_operations.allowed)?;
    writeln!(out, "  Blocked: {}", report.network_operations.blocked)?;
    for event in &report.network_operations.details {
        if let ActivityKind::Network {
            operation,
            address,
            allowed,
            reason,
        } = &event.kind
        {
            writeln!(
                out,
                "    {}: {} to {}",
                verdict_label(*allowed),
                operation,
                address
            )?;
            if !allowed {
                writeln!(out, "      Reason: {}", reason)?;
            }
        }
    }

    writeln!(out, "\nExceptions ({} total):", report.exceptions.total)?;
    for event in &report.exceptions.details {
        if let ActivityKind::Exception {
            exception_type,
            message,
            ..
        } = &event.kind
        {
            writeln!(out, "    {}: {}", exception_type, message)?;
        }
    }

    writeln!(out, "{}", "=".repeat(60))?;
    Ok(())
}

fn verdict_label(allowed: bool) -> &'static str {
    if allowed {
        "ALLOWED"
    } else {
        "BLOCKED"
    }
}
