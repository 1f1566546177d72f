//! Plain-text rendering for the CLI.

use std::io::{self, Write};

use cronboard_scheduler::{
    EnqueueOutcome, ExecutionOutcome, JobCatalog, ScheduleRecord, ScheduleStatus,
};

pub fn print_jobs(
    out: &mut impl Write,
    catalog: &dyn JobCatalog,
    names: &[String],
) -> io::Result<()> {
    writeln!(out, "{:<40} {:<12} {:<10} {:<9} SCHEDULE", "NAME", "GROUP", "INSTANCE", "STATUS")?;
    for name in names {
        match catalog.get(name) {
            Some(job) => writeln!(
                out,
                "{:<40} {:<12} {:<10} {:<9} {}",
                job.name,
                job.group,
                job.instance,
                job.column("status"),
                job.schedule.as_deref().unwrap_or("-"),
            )?,
            None => writeln!(out, "{name:<40} {:<12} {:<10} {:<9} -", "-", "-", "unknown")?,
        }
    }
    writeln!(out, "{} job(s)", names.len())
}

pub fn print_execution(out: &mut impl Write, outcome: &ExecutionOutcome) -> io::Result<()> {
    writeln!(
        out,
        "{} job(s) succeeded, {} job(s) failed",
        outcome.success_count, outcome.failure_count
    )?;
    print_warnings(out, &outcome.warnings)
}

pub fn print_enqueue(
    out: &mut impl Write,
    outcome: &EnqueueOutcome,
    status: ScheduleStatus,
) -> io::Result<()> {
    writeln!(out, "{} job(s) scheduled as {status}", outcome.enqueued)?;
    print_warnings(out, &outcome.warnings)
}

pub fn print_history(out: &mut impl Write, records: &[ScheduleRecord]) -> io::Result<()> {
    writeln!(
        out,
        "{:>6} {:<40} {:<8} {:<20} {:<20} MESSAGES",
        "ID", "JOB", "STATUS", "SCHEDULED", "EXECUTED"
    )?;
    for r in records {
        writeln!(
            out,
            "{:>6} {:<40} {:<8} {:<20} {:<20} {}",
            r.schedule_id.map(|id| id.to_string()).unwrap_or_default(),
            r.job_code,
            r.status,
            r.scheduled_at.format("%Y-%m-%d %H:%M:%S"),
            r.executed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.messages.as_deref().map(first_line).unwrap_or(""),
        )?;
    }
    Ok(())
}

fn print_warnings(out: &mut impl Write, warnings: &[String]) -> io::Result<()> {
    for w in warnings {
        writeln!(out, "warning: {w}")?;
    }
    Ok(())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}
