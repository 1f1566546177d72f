use thiserror::Error;

#[derive(Debug, Error)]
pub enum CronboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid selection: {0}")]
    Selection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CronboardError {
    /// Short error code string printed by the CLI next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            CronboardError::Config(_) => "CONFIG_ERROR",
            CronboardError::Database(_) => "DATABASE_ERROR",
            CronboardError::Selection(_) => "SELECTION_ERROR",
            CronboardError::Serialization(_) => "SERIALIZATION_ERROR",
            CronboardError::Io(_) => "IO_ERROR",
            CronboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CronboardError>;
