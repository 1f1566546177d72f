use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::floor_to_minute;

/// Lifecycle state of a schedule record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Waiting for an external runner to pick it up.
    #[default]
    Pending,
    /// Claimed by a runner.
    Running,
    /// Ran to completion.
    Success,
    /// The scheduled window passed without a run.
    Missed,
    /// The job reported failure; see `messages`.
    Error,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Running => "running",
            ScheduleStatus::Success => "success",
            ScheduleStatus::Missed => "missed",
            ScheduleStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScheduleStatus::Pending),
            "running" => Ok(ScheduleStatus::Running),
            "success" => Ok(ScheduleStatus::Success),
            "missed" => Ok(ScheduleStatus::Missed),
            "error" => Ok(ScheduleStatus::Error),
            other => Err(format!("unknown schedule status: {other}")),
        }
    }
}

/// One row of the `cron_schedule` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Assigned by the store; `None` until persisted.
    pub schedule_id: Option<i64>,
    /// Catalog name of the job.
    pub job_code: String,
    pub status: ScheduleStatus,
    /// Failure text, or handler output on success.
    pub messages: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Always on a minute boundary.
    pub scheduled_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl ScheduleRecord {
    /// Build an unsaved record from a single clock reading.
    pub fn new(job_code: impl Into<String>, status: ScheduleStatus, now: DateTime<Utc>) -> Self {
        Self {
            schedule_id: None,
            job_code: job_code.into(),
            status,
            messages: None,
            created_at: now,
            scheduled_at: floor_to_minute(now),
            executed_at: None,
        }
    }

    /// Rewrite the record in place after the job logic failed.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = ScheduleStatus::Error;
        self.messages = Some(message.into());
        self.executed_at = None;
    }
}

/// Tally of an executor batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    /// Persistence failures, one line each, meant for the operator.
    pub warnings: Vec<String>,
}

impl ExecutionOutcome {
    /// `(success, failure)` pair.
    pub fn counts(&self) -> (usize, usize) {
        (self.success_count, self.failure_count)
    }
}

/// Tally of an enqueue batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnqueueOutcome {
    /// Records actually persisted.
    pub enqueued: usize,
    pub warnings: Vec<String>,
}
