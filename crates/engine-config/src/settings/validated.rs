use connectors::sql::{base::destination::Destination, mssql::config::MssqlConnectOptions};
use engine_core::retry::RetryPolicy;
use model::execution::mode::WriteMode;

/// Immutable, validated configuration for one write session.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    pub connection: MssqlConnectOptions,
    /// Resolved destination table, with its typed columns.
    pub destination: Destination,
    pub mode: WriteMode,
    pub staging_prefix: String,
    pub retry: RetryPolicy,
    /// Rows per batch on the read path
    pub batch_size: usize,
}
