use thiserror::Error;

/// Errors raised by a [`crate::store::ScheduleStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored timestamp could not be parsed back.
    #[error("Invalid timestamp in {column}: {value}")]
    Timestamp { column: &'static str, value: String },

    /// A stored status string is not a known [`crate::types::ScheduleStatus`].
    #[error("Invalid status: {0}")]
    Status(String),

    /// The backend cannot accept writes right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure signalled by job logic. Never leaves the executor; it becomes the
/// `messages` column of an `error` record.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job ran and reported failure. The message is stored verbatim.
    #[error("{0}")]
    ExecutionFailed(String),

    /// No handler is registered for the descriptor's `instance`.
    #[error("No handler registered for instance '{instance}'")]
    HandlerNotFound { instance: String },

    /// The handler panicked.
    #[error("Job panicked: {0}")]
    Panicked(String),
}

/// The selection payload does not match any of the accepted shapes.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Invalid selection payload: {0}")]
    InvalidPayload(String),
}

impl From<SelectionError> for cronboard_core::CronboardError {
    fn from(e: SelectionError) -> Self {
        cronboard_core::CronboardError::Selection(e.to_string())
    }
}

impl From<StoreError> for cronboard_core::CronboardError {
    fn from(e: StoreError) -> Self {
        cronboard_core::CronboardError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
