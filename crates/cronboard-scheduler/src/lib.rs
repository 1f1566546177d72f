//! `cronboard-scheduler` — select catalog jobs, run them now or enqueue them.
//!
//! # Overview
//!
//! A [`selector::SelectionRequest`] is resolved against a [`catalog::JobCatalog`]
//! into an ordered list of job names. Those names are then either handed to
//! the [`executor::Executor`], which runs each job synchronously and persists
//! one `success`/`error` record per job, or to the [`enqueue::Enqueuer`],
//! which only writes records (default status `pending`) for a separate
//! runner to pick up later.
//!
//! Disabled and unknown jobs are skipped silently by both paths.
//!
//! | Selection  | Payload key | Result                                   |
//! |------------|-------------|------------------------------------------|
//! | `Explicit` | `selected`  | the ids, verbatim                        |
//! | `Excluded` | `excluded`  | every catalog name not in the list       |
//! | `Filtered` | `filters`   | names whose columns contain every value  |

pub mod catalog;
pub mod clock;
pub mod db;
pub mod enqueue;
pub mod error;
pub mod executor;
pub mod handler;
pub mod selector;
pub mod store;
pub mod trigger;
pub mod types;

pub use catalog::{JobCatalog, StaticCatalog};
pub use clock::{floor_to_minute, Clock, FixedClock, SystemClock};
pub use enqueue::Enqueuer;
pub use error::{JobError, Result, SelectionError, StoreError};
pub use executor::Executor;
pub use handler::{CommandHandler, HandlerRegistry, JobHandler, NoopHandler};
pub use selector::SelectionRequest;
pub use store::{ScheduleStore, SqliteScheduleStore};
pub use trigger::JobTrigger;
pub use types::{EnqueueOutcome, ExecutionOutcome, ScheduleRecord, ScheduleStatus};
