use connectors::sql::base::error::{ConnectorError, DbError};
use engine_core::{error::SinkError, retry::RetryDisposition};
use tiberius::error::Error as MssqlError;

/// SQL Server error numbers that clear up on their own: deadlock victim,
/// lock timeout, database unavailable, Azure SQL throttling and failover,
/// and transport-level disconnects.
/// See: https://learn.microsoft.com/en-us/azure/azure-sql/database/troubleshoot-common-errors-issues
const RETRYABLE_CODES: [u32; 16] = [
    1205, 1222, 4060, 40197, 40501, 40613, 49918, 49919, 49920, 10928, 10929, 233, 10053, 10054,
    10060, 64,
];

pub fn classify_sink_error(err: &SinkError) -> RetryDisposition {
    match err {
        SinkError::Db(db_err) => classify_db_error(db_err),
        SinkError::DestinationExists { .. } => RetryDisposition::Stop,
        SinkError::Validation(_) => RetryDisposition::Stop,
        SinkError::RetriesExhausted { .. } => RetryDisposition::Stop,
    }
}

pub fn classify_db_error(err: &DbError) -> RetryDisposition {
    match err {
        DbError::Io(_) => RetryDisposition::Retry,
        DbError::Mssql(mssql_err) => classify_mssql_error(mssql_err),
        DbError::InvalidPath(_) => RetryDisposition::Stop,
        DbError::Write(_) => RetryDisposition::Stop,
        DbError::UnexpectedResult(_) => RetryDisposition::Stop,
        DbError::Unknown(_) => RetryDisposition::Stop,
    }
}

pub fn classify_connector_error(err: &ConnectorError) -> RetryDisposition {
    match err {
        ConnectorError::Tcp { .. } => RetryDisposition::Retry,
        ConnectorError::Mssql(mssql_err) => classify_mssql_error(mssql_err),
        ConnectorError::Setup(db_err) => classify_db_error(db_err),
    }
}

fn classify_mssql_error(err: &MssqlError) -> RetryDisposition {
    match err {
        MssqlError::Io { .. } | MssqlError::Protocol(_) => RetryDisposition::Retry,
        MssqlError::Routing { .. } => RetryDisposition::Retry,
        MssqlError::Server(token) if is_retryable_server_code(token.code()) => {
            RetryDisposition::Retry
        }
        _ => RetryDisposition::Stop,
    }
}

pub fn is_retryable_server_code(code: u32) -> bool {
    RETRYABLE_CODES.contains(&code)
}
