use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Low‐level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any error reported by the SQL Server driver, including server errors.
    #[error("SQL Server error: {0}")]
    Mssql(#[from] tiberius::error::Error),

    /// The resource path does not name a table.
    #[error("Invalid resource path: {0}")]
    InvalidPath(String),

    /// Rows handed to a write do not fit the destination.
    #[error("Write error: {0}")]
    Write(String),

    /// A query returned something other than the expected shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Failed to reach {addr}: {source}")]
    Tcp {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The TDS handshake or login failed.
    #[error("SQL Server connection failed: {0}")]
    Mssql(#[from] tiberius::error::Error),

    #[error("Session setup failed: {0}")]
    Setup(#[from] DbError),
}
