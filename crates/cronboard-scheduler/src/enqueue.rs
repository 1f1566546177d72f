use tracing::{debug, info, warn};

use crate::{
    catalog::JobCatalog,
    clock::Clock,
    store::ScheduleStore,
    types::{EnqueueOutcome, ScheduleRecord, ScheduleStatus},
};

/// Writes schedule records for named jobs without running them.
pub struct Enqueuer<'a> {
    catalog: &'a dyn JobCatalog,
    store: &'a dyn ScheduleStore,
    clock: &'a dyn Clock,
}

impl<'a> Enqueuer<'a> {
    pub fn new(
        catalog: &'a dyn JobCatalog,
        store: &'a dyn ScheduleStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            catalog,
            store,
            clock,
        }
    }

    /// Persist one `status` record per enabled job in `names`.
    ///
    /// Only records that were actually saved are counted.
    pub fn enqueue_all<S: AsRef<str>>(
        &self,
        names: &[S],
        status: ScheduleStatus,
    ) -> EnqueueOutcome {
        let mut outcome = EnqueueOutcome::default();

        for name in names {
            let name = name.as_ref();
            if self.catalog.is_disabled(name) {
                debug!(job = %name, "skipping disabled or unknown job");
                continue;
            }

            let record = ScheduleRecord::new(name, status, self.clock.now());
            match self.store.save(&record) {
                Ok(id) => {
                    debug!(job = %name, schedule_id = id, %status, "job enqueued");
                    outcome.enqueued += 1;
                }
                Err(e) => {
                    warn!(job = %name, error = %e, "failed to enqueue job");
                    outcome.warnings.push(e.to_string());
                }
            }
        }

        info!(
            enqueued = outcome.enqueued,
            warnings = outcome.warnings.len(),
            %status,
            "job batch enqueued"
        );
        outcome
    }
}
