use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::{
    catalog::JobCatalog,
    clock::{Clock, SystemClock},
    enqueue::Enqueuer,
    error::{Result, SelectionError},
    executor::Executor,
    handler::HandlerRegistry,
    selector::SelectionRequest,
    store::ScheduleStore,
    types::{EnqueueOutcome, ExecutionOutcome, ScheduleRecord, ScheduleStatus},
};

/// Entry point for callers (CLI, request handlers): selection, run-now and
/// enqueue over one catalog and one store.
#[derive(Clone)]
pub struct JobTrigger {
    catalog: Arc<dyn JobCatalog>,
    store: Arc<dyn ScheduleStore>,
    handlers: Arc<HandlerRegistry>,
    clock: Arc<dyn Clock>,
}

impl JobTrigger {
    pub fn new(
        catalog: Arc<dyn JobCatalog>,
        store: Arc<dyn ScheduleStore>,
        handlers: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            catalog,
            store,
            handlers,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &dyn JobCatalog {
        self.catalog.as_ref()
    }

    /// Parse a raw payload (`selected` / `excluded` / `filters`) and resolve it.
    pub fn resolve_selection(
        &self,
        payload: &Value,
    ) -> std::result::Result<Vec<String>, SelectionError> {
        Ok(self.resolve(&SelectionRequest::from_payload(payload)?))
    }

    pub fn resolve(&self, request: &SelectionRequest) -> Vec<String> {
        request.resolve(self.catalog.as_ref())
    }

    #[instrument(skip_all, fields(jobs = names.len()))]
    pub fn execute_jobs<S: AsRef<str>>(&self, names: &[S]) -> ExecutionOutcome {
        Executor::new(
            self.catalog.as_ref(),
            self.handlers.as_ref(),
            self.store.as_ref(),
            self.clock.as_ref(),
        )
        .run_all(names)
    }

    #[instrument(skip_all, fields(jobs = names.len(), status = %status))]
    pub fn schedule_jobs<S: AsRef<str>>(
        &self,
        names: &[S],
        status: ScheduleStatus,
    ) -> EnqueueOutcome {
        Enqueuer::new(self.catalog.as_ref(), self.store.as_ref(), self.clock.as_ref())
            .enqueue_all(names, status)
    }

    /// Recent records, newest first.
    pub fn history(&self, job_code: Option<&str>, limit: usize) -> Result<Vec<ScheduleRecord>> {
        self.store.recent(job_code, limit)
    }
}
