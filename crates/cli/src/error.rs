use connectors::sql::base::error::{ConnectorError, DbError};
use engine_config::settings::error::SettingsError;
use engine_processing::error::PipelineError;
use planner::query::offsets::OffsetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to deserialize {what} as JSON: {source}")]
    Deserialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to connect to SQL Server: {0}")]
    Connect(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Unsupported offset: {0}")]
    Offset(#[from] OffsetError),

    #[error("Write session failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Shutdown requested")]
    ShutdownRequested,
}
