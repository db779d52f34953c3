use crate::settings::{
    connection::ConnectionSettings, error::SettingsError, read::ReadSettings,
    retry::RetrySettings, validated::ValidatedSettings, validator::SettingsValidator,
    write::WriteSettings,
};
use serde::Deserialize;
use std::path::Path;

pub mod connection;
pub mod error;
pub mod read;
pub mod retry;
pub mod validated;
pub mod validator;
pub mod write;

/// Settings file of the SQL Server destination.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub write: WriteSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub read: ReadSettings,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        SettingsValidator::new(self).validate()
    }
}
