use std::panic::{catch_unwind, AssertUnwindSafe};

use cronboard_core::JobDescriptor;
use tracing::{debug, error, info, warn};

use crate::{
    catalog::JobCatalog,
    clock::Clock,
    error::JobError,
    handler::HandlerRegistry,
    store::ScheduleStore,
    types::{ExecutionOutcome, ScheduleRecord, ScheduleStatus},
};

/// Runs named jobs right now, one after another, and records each outcome.
///
/// A failing (or panicking) job only affects its own record; the batch always
/// reaches the end of the list.
pub struct Executor<'a> {
    catalog: &'a dyn JobCatalog,
    handlers: &'a HandlerRegistry,
    store: &'a dyn ScheduleStore,
    clock: &'a dyn Clock,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a dyn JobCatalog,
        handlers: &'a HandlerRegistry,
        store: &'a dyn ScheduleStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            catalog,
            handlers,
            store,
            clock,
        }
    }

    /// Execute `names` in order. Disabled and unknown names are skipped and
    /// counted nowhere.
    pub fn run_all<S: AsRef<str>>(&self, names: &[S]) -> ExecutionOutcome {
        let mut outcome = ExecutionOutcome::default();

        for name in names {
            let name = name.as_ref();
            if self.catalog.is_disabled(name) {
                debug!(job = %name, "skipping disabled or unknown job");
                continue;
            }
            let Some(job) = self.catalog.get(name) else {
                continue;
            };

            // One clock read per record.
            let now = self.clock.now();
            let mut record = ScheduleRecord::new(name, ScheduleStatus::Success, now);
            record.executed_at = Some(now);

            match self.invoke(&job, &mut record) {
                Ok(()) => {
                    debug!(job = %name, "job succeeded");
                    outcome.success_count += 1;
                }
                Err(e) => {
                    error!(job = %name, error = %e, "job failed");
                    record.mark_failed(e.to_string());
                    outcome.failure_count += 1;
                }
            }

            if let Err(e) = self.store.save(&record) {
                warn!(job = %name, error = %e, "failed to save schedule record");
                outcome.warnings.push(e.to_string());
            }
        }

        info!(
            success = outcome.success_count,
            failure = outcome.failure_count,
            warnings = outcome.warnings.len(),
            "job batch executed"
        );
        outcome
    }

    fn invoke(&self, job: &JobDescriptor, record: &mut ScheduleRecord) -> Result<(), JobError> {
        match catch_unwind(AssertUnwindSafe(|| self.handlers.invoke(job, record))) {
            Ok(result) => result,
            Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
