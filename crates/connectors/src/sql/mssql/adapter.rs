use crate::sql::{
    base::{
        adapter::SqlExecutor,
        error::{ConnectorError, DbError},
        requests::ReadQuery,
    },
    mssql::{config::MssqlConnectOptions, row::convert_row},
};
use async_trait::async_trait;
use model::records::row::Row;
use planner::query::{ast::statement::Statement, dialect};
use std::sync::Arc;
use tiberius::Client;
use tokio::{net::TcpStream, sync::Mutex};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, trace};

type MssqlClient = Client<Compat<TcpStream>>;

const SET_IMPLICIT_TRANSACTIONS: &str = "SET IMPLICIT_TRANSACTIONS ON";
const COMMIT_SQL: &str = "IF @@TRANCOUNT > 0 COMMIT TRANSACTION";
const ROLLBACK_SQL: &str = "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION";
const VERSION_SQL: &str = "SELECT @@VERSION";

/// One SQL Server session with auto-commit disabled.
///
/// The driver needs exclusive access per request, so the client sits behind
/// a mutex and statements from clones of the adapter are serialized.
#[derive(Clone)]
pub struct MssqlAdapter {
    client: Arc<Mutex<MssqlClient>>,
    dialect: dialect::SqlServer,
}

impl MssqlAdapter {
    pub async fn connect(options: &MssqlConnectOptions) -> Result<Self, ConnectorError> {
        let config = options.to_config();
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|source| ConnectorError::Tcp {
                addr: options.addr(),
                source,
            })?;
        tcp.set_nodelay(true).ok();

        let mut client = Client::connect(config, tcp.compat_write()).await?;
        client
            .simple_query(SET_IMPLICIT_TRANSACTIONS)
            .await
            .map_err(DbError::from)?
            .into_results()
            .await
            .map_err(DbError::from)?;

        info!(addr = %options.addr(), "Connected to SQL Server");
        Ok(MssqlAdapter {
            client: Arc::new(Mutex::new(client)),
            dialect: dialect::SqlServer,
        })
    }

    /// Round-trips a trivial query and returns the server version banner.
    pub async fn ping(&self) -> Result<String, DbError> {
        let mut client = self.client.lock().await;
        let row = client
            .simple_query(VERSION_SQL)
            .await?
            .into_row()
            .await?
            .ok_or_else(|| DbError::UnexpectedResult("no row from @@VERSION".into()))?;

        Ok(row.get::<&str, _>(0).unwrap_or_default().to_string())
    }

    /// Runs an incremental read and splits the result into batches of
    /// `query.batch_size` rows.
    pub async fn fetch_batches(&self, query: &ReadQuery) -> Result<Vec<Vec<Row>>, DbError> {
        let rows = self.query_rows(&query.statement()).await?;
        let batches: Vec<Vec<Row>> = rows
            .chunks(query.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        trace!(rows = rows.len(), batches = batches.len(), "Fetched read batches");
        Ok(batches)
    }

    fn render(&self, statement: &Statement) -> String {
        let sql = statement.to_sql(&self.dialect);
        debug!(kind = statement.kind(), %sql, "Rendered statement");
        sql
    }

    async fn run_raw(&self, sql: &str) -> Result<(), DbError> {
        let mut client = self.client.lock().await;
        client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for MssqlAdapter {
    async fn execute(&self, statement: &Statement) -> Result<u64, DbError> {
        let sql = self.render(statement);
        let mut client = self.client.lock().await;
        let result = client.execute(sql, &[]).await?;
        Ok(result.total())
    }

    async fn query_scalar(&self, statement: &Statement) -> Result<i64, DbError> {
        let rows = self.query_rows(statement).await?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| {
                DbError::UnexpectedResult(format!("{} returned no integer", statement.kind()))
            })
    }

    async fn query_rows(&self, statement: &Statement) -> Result<Vec<Row>, DbError> {
        let sql = self.render(statement);
        let mut client = self.client.lock().await;
        let rows = client.simple_query(sql).await?.into_first_result().await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn commit(&self) -> Result<(), DbError> {
        self.run_raw(COMMIT_SQL).await
    }

    async fn rollback(&self) -> Result<(), DbError> {
        self.run_raw(ROLLBACK_SQL).await
    }
}
