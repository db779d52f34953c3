use crate::retry::RetryError;
use connectors::sql::base::error::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    /// Create mode found the destination already there. Raised before any
    /// write, never retried.
    #[error("Access denied: destination {path} already exists")]
    DestinationExists { path: String },

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// The request cannot be carried out against this destination.
    #[error("Invalid write: {0}")]
    Validation(String),

    #[error("Retry attempts exhausted during {stage}: {source}")]
    RetriesExhausted {
        stage: &'static str,
        #[source]
        source: Box<SinkError>,
    },
}

impl SinkError {
    /// Unwraps a retry outcome, tagging exhausted budgets with the stage that
    /// ran out.
    pub fn from_retry(stage: &'static str, err: RetryError<SinkError>) -> Self {
        match err {
            RetryError::Fatal(e) => e,
            RetryError::AttemptsExceeded(e) => SinkError::RetriesExhausted {
                stage,
                source: Box::new(e),
            },
        }
    }
}
