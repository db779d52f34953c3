use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::records::row::Row;
use planner::query::ast::statement::Statement;

/// Transactional statement execution against the destination database.
///
/// Auto-commit is off: every statement joins the open transaction, which
/// only ends with an explicit [`commit`](SqlExecutor::commit) or
/// [`rollback`](SqlExecutor::rollback).
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64, DbError>;

    /// Runs a query yielding a single integer, such as a catalog probe.
    async fn query_scalar(&self, statement: &Statement) -> Result<i64, DbError>;

    async fn query_rows(&self, statement: &Statement) -> Result<Vec<Row>, DbError>;

    async fn commit(&self) -> Result<(), DbError>;

    async fn rollback(&self) -> Result<(), DbError>;

    /// Runs statements in order inside the current transaction, stopping at
    /// the first failure.
    async fn execute_all(&self, statements: &[Statement]) -> Result<u64, DbError> {
        let mut affected = 0;
        for statement in statements {
            affected += self.execute(statement).await?;
        }
        Ok(affected)
    }
}
