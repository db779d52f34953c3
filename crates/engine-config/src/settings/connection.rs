use crate::settings::error::SettingsError;
use connectors::sql::mssql::config::{DEFAULT_PORT, MssqlConnectOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Name of an environment variable holding the password. Takes
    /// precedence over `password`.
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default)]
    pub trust_cert: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionSettings {
    pub fn resolve_password(&self) -> Result<String, SettingsError> {
        match &self.password_env {
            Some(var) => std::env::var(var).map_err(|_| SettingsError::MissingEnv(var.clone())),
            None => Ok(self.password.clone().unwrap_or_default()),
        }
    }

    pub fn to_options(&self) -> Result<MssqlConnectOptions, SettingsError> {
        let mut options =
            MssqlConnectOptions::new(&self.host, &self.user, self.resolve_password()?);
        options.port = self.port;
        options.database = self.database.clone();
        options.encrypt = self.encrypt;
        options.trust_cert = self.trust_cert;
        Ok(options)
    }
}
