use connectors::sql::base::error::DbError;
use thiserror::Error;

/// Errors raised when loading or validating connector settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the settings model.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// One or more settings are invalid; every problem found is listed.
    #[error("Settings validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// The password was to be taken from an environment variable that is
    /// not set.
    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    /// The destination could not be resolved.
    #[error("Database error in settings: {0}")]
    Database(#[from] DbError),
}
