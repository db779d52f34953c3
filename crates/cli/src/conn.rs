use crate::error::CliError;
use async_trait::async_trait;
use connectors::sql::mssql::{adapter::MssqlAdapter, config::MssqlConnectOptions};
use engine_core::retry::RetryPolicy;
use engine_processing::retry::classify_connector_error;
use tracing::{error, info};

/// Opens a session, retrying transient network and login failures.
pub async fn connect(
    options: &MssqlConnectOptions,
    retry: &RetryPolicy,
) -> Result<MssqlAdapter, CliError> {
    retry
        .run(|| MssqlAdapter::connect(options), classify_connector_error)
        .await
        .map_err(|e| {
            let e = e.into_inner();
            error!("SQL Server connection to '{}' failed: {}", options.addr(), e);
            CliError::Connect(e)
        })
}

/// Trait for "pinging" a data source
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns the server version, or Err if unreachable
    async fn ping(&self) -> Result<String, CliError>;
}

pub struct MssqlConnectionPinger {
    pub options: MssqlConnectOptions,
}

#[async_trait]
impl ConnectionPinger for MssqlConnectionPinger {
    async fn ping(&self) -> Result<String, CliError> {
        info!("Pinging SQL Server at '{}'", self.options.addr());

        let adapter = connect(&self.options, &RetryPolicy::none()).await?;
        let version = adapter.ping().await.map_err(|e| {
            error!("SQL Server ping on '{}' failed: {}", self.options.addr(), e);
            CliError::Database(e)
        })?;

        info!("SQL Server ping to '{}' succeeded", self.options.addr());
        Ok(version)
    }
}
