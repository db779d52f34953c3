//! An in-memory stand-in for a SQL Server session.
//!
//! Statements are interpreted from the AST rather than parsed from SQL.
//! Writes go to a working copy that `commit` publishes and `rollback`
//! discards, which is enough to observe transaction boundaries.

use async_trait::async_trait;
use connectors::sql::base::{adapter::SqlExecutor, error::DbError};
use model::{core::value::Value, records::row::Row};
use planner::query::{
    ast::{
        common::TableRef,
        delete::{Delete, DeleteFilter},
        expr::{BinaryOperator, Expr},
        insert::{Insert, InsertSource},
        select::Select,
        statement::Statement,
    },
    dialect::SqlServer,
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub indexes: Vec<String>,
}

impl MemoryTable {
    fn position(&self, column: &str) -> Result<usize, DbError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DbError::Unknown(format!("Invalid column name '{column}'")))
    }

    /// Values of `column`, one per row.
    pub fn column_values(&self, column: &str) -> Vec<Value> {
        match self.position(column) {
            Ok(idx) => self.rows.iter().map(|row| row[idx].clone()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Failure to inject into the next statement of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A dropped connection; classified as retryable.
    Transient,
    /// A non-retryable server error.
    Fatal,
}

impl Fault {
    fn to_error(self, kind: &str) -> DbError {
        match self {
            Fault::Transient => DbError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("injected transient failure on {kind}"),
            )),
            Fault::Fatal => DbError::Unknown(format!("injected fatal failure on {kind}")),
        }
    }
}

#[derive(Debug)]
struct FailPoint {
    kind: &'static str,
    fault: Fault,
    remaining: usize,
}

type Tables = BTreeMap<String, MemoryTable>;

#[derive(Debug, Default)]
struct State {
    committed: Tables,
    working: Tables,
    log: Vec<String>,
    fail_points: VecDeque<FailPoint>,
    commits: usize,
    rollbacks: usize,
}

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: Mutex<State>,
}

fn key(table: &TableRef) -> String {
    table.to_string()
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a committed table with the given rows.
    pub fn seed(&self, table: &TableRef, columns: &[&str], rows: Vec<Row>) {
        let mut state = self.lock();
        let table_data = MemoryTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            indexes: Vec::new(),
        };
        state.committed.insert(key(table), table_data.clone());
        state.working.insert(key(table), table_data);
    }

    /// Fails the next `times` statements of `kind` (a [`Statement::kind`],
    /// or `"commit"`) with `fault`.
    pub fn fail_next(&self, kind: &'static str, fault: Fault, times: usize) {
        if times == 0 {
            return;
        }
        self.lock().fail_points.push_back(FailPoint {
            kind,
            fault,
            remaining: times,
        });
    }

    /// Committed state of a table.
    pub fn table(&self, table: &TableRef) -> Option<MemoryTable> {
        self.lock().committed.get(&key(table)).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.lock().committed.keys().cloned().collect()
    }

    pub fn row_count(&self, table: &TableRef) -> Option<usize> {
        self.table(table).map(|t| t.rows.len())
    }

    /// Rendered SQL of every statement run so far, failed ones included.
    pub fn statements(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test poisons the lock; the state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_fault(state: &mut State, kind: &'static str) -> Result<(), DbError> {
        let Some(point) = state.fail_points.iter_mut().find(|p| p.kind == kind) else {
            return Ok(());
        };
        let fault = point.fault;
        point.remaining -= 1;
        state.fail_points.retain(|p| p.remaining > 0);
        Err(fault.to_error(kind))
    }

    fn run(&self, statement: &Statement) -> Result<Outcome, DbError> {
        let mut state = self.lock();
        state.log.push(statement.to_sql(&SqlServer));
        Self::check_fault(&mut state, statement.kind())?;

        let tables = &mut state.working;
        match statement {
            Statement::TableExists(probe) => {
                let exists = tables.contains_key(&key(&probe.table));
                Ok(Outcome::Rows(vec![vec![Value::Int(exists as i64)]]))
            }
            Statement::CreateTable(create) => {
                if tables.contains_key(&key(&create.table)) {
                    if create.if_not_exists {
                        return Ok(Outcome::Affected(0));
                    }
                    return Err(DbError::Unknown(format!(
                        "There is already an object named '{}' in the database",
                        create.table
                    )));
                }
                let columns = create.columns.iter().map(|c| c.name.clone()).collect();
                tables.insert(
                    key(&create.table),
                    MemoryTable {
                        columns,
                        ..Default::default()
                    },
                );
                Ok(Outcome::Affected(0))
            }
            Statement::DropTable(drop) => {
                if tables.remove(&key(&drop.table)).is_none() && !drop.if_exists {
                    return Err(missing(&drop.table));
                }
                Ok(Outcome::Affected(0))
            }
            Statement::Truncate(truncate) => {
                table_mut(tables, &truncate.table)?.rows.clear();
                Ok(Outcome::Affected(0))
            }
            Statement::RenameTable(rename) => {
                let target = rename.table.sibling(rename.new_name.clone());
                if tables.contains_key(&key(&target)) {
                    return Err(DbError::Unknown(format!(
                        "There is already an object named '{target}' in the database"
                    )));
                }
                let moved = tables
                    .remove(&key(&rename.table))
                    .ok_or_else(|| missing(&rename.table))?;
                tables.insert(key(&target), moved);
                Ok(Outcome::Affected(0))
            }
            Statement::CreateIndex(index) => {
                let table = table_mut(tables, &index.table)?;
                if table.indexes.contains(&index.name) {
                    return Err(DbError::Unknown(format!(
                        "The index '{}' already exists on '{}'",
                        index.name, index.table
                    )));
                }
                for column in &index.columns {
                    table.position(column)?;
                }
                table.indexes.push(index.name.clone());
                Ok(Outcome::Affected(0))
            }
            Statement::Insert(insert) => insert_rows(tables, insert).map(Outcome::Affected),
            Statement::Delete(delete) => delete_rows(tables, delete).map(Outcome::Affected),
            Statement::Select(select) => select_rows(tables, select).map(Outcome::Rows),
        }
    }
}

enum Outcome {
    Affected(u64),
    Rows(Vec<Row>),
}

fn missing(table: &TableRef) -> DbError {
    DbError::Unknown(format!("Invalid object name '{table}'"))
}

fn table_mut<'a>(tables: &'a mut Tables, table: &TableRef) -> Result<&'a mut MemoryTable, DbError> {
    tables.get_mut(&key(table)).ok_or_else(|| missing(table))
}

fn literal(expr: &Expr) -> Result<Value, DbError> {
    match expr {
        Expr::Value(v) => Ok(v.clone()),
        other => Err(DbError::Unknown(format!("expected a literal, got {other:?}"))),
    }
}

fn project(table: &MemoryTable, columns: &[String], row: &Row) -> Result<Row, DbError> {
    columns
        .iter()
        .map(|c| table.position(c).map(|idx| row[idx].clone()))
        .collect()
}

fn insert_rows(tables: &mut Tables, insert: &Insert) -> Result<u64, DbError> {
    let incoming: Vec<Row> = match &insert.source {
        InsertSource::Values(rows) => rows
            .iter()
            .map(|row| row.iter().map(literal).collect::<Result<Row, _>>())
            .collect::<Result<_, _>>()?,
        InsertSource::Select(select) => select_rows(tables, select)?,
    };

    let target = table_mut(tables, &insert.table)?;
    let positions = insert
        .columns
        .iter()
        .map(|c| target.position(c))
        .collect::<Result<Vec<_>, _>>()?;

    for values in &incoming {
        if values.len() != positions.len() {
            return Err(DbError::Unknown(
                "The number of supplied values does not match the column list".into(),
            ));
        }
        let mut row = vec![Value::Null; target.columns.len()];
        for (pos, value) in positions.iter().zip(values) {
            row[*pos] = value.clone();
        }
        target.rows.push(row);
    }
    Ok(incoming.len() as u64)
}

fn select_rows(tables: &Tables, select: &Select) -> Result<Vec<Row>, DbError> {
    let from = select
        .from
        .as_ref()
        .ok_or_else(|| DbError::Unknown("SELECT without FROM".into()))?;
    let table = tables.get(&key(from)).ok_or_else(|| missing(from))?;

    let columns: Vec<String> = if select.columns.is_empty() {
        table.columns.clone()
    } else {
        select
            .columns
            .iter()
            .map(|c| match c {
                Expr::Identifier(ident) => Ok(ident.name.clone()),
                other => Err(DbError::Unknown(format!("unsupported projection {other:?}"))),
            })
            .collect::<Result<_, _>>()?
    };

    let mut rows = Vec::new();
    for row in &table.rows {
        let keep = match &select.where_clause {
            Some(predicate) => matches(table, row, predicate)?,
            None => true,
        };
        if keep {
            rows.push(project(table, &columns, row)?);
        }
    }
    Ok(rows)
}

fn matches(table: &MemoryTable, row: &Row, predicate: &Expr) -> Result<bool, DbError> {
    match predicate {
        Expr::BinaryOp(op) if op.op == BinaryOperator::And => {
            Ok(matches(table, row, &op.left)? && matches(table, row, &op.right)?)
        }
        Expr::BinaryOp(op) => {
            let Expr::Identifier(ident) = &op.left else {
                return Err(DbError::Unknown("left side must be a column".into()));
            };
            let value = &row[table.position(&ident.name)?];
            let ordering = value.compare(&literal(&op.right)?);
            Ok(match op.op {
                BinaryOperator::Eq => ordering == Some(Ordering::Equal),
                BinaryOperator::Gt => ordering == Some(Ordering::Greater),
                BinaryOperator::GtEq => {
                    matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                }
                BinaryOperator::And => unreachable!("handled above"),
            })
        }
        Expr::InList { expr, list } => {
            let Expr::Identifier(ident) = expr.as_ref() else {
                return Err(DbError::Unknown("IN needs a column".into()));
            };
            let value = &row[table.position(&ident.name)?];
            let list = list.iter().map(literal).collect::<Result<Vec<_>, _>>()?;
            Ok(list.iter().any(|candidate| candidate.equal(value)))
        }
        other => Err(DbError::Unknown(format!("unsupported predicate {other:?}"))),
    }
}

fn delete_rows(tables: &mut Tables, delete: &Delete) -> Result<u64, DbError> {
    match &delete.filter {
        DeleteFilter::MatchingKeys { staging, key: column } => {
            let staged = tables
                .get(&key(staging))
                .ok_or_else(|| missing(staging))?
                .column_values(column);
            let target = table_mut(tables, &delete.table)?;
            let idx = target.position(column)?;
            let before = target.rows.len();
            target
                .rows
                .retain(|row| !staged.iter().any(|k| k.equal(&row[idx])));
            Ok((before - target.rows.len()) as u64)
        }
        DeleteFilter::Where(predicate) => {
            let target = table_mut(tables, &delete.table)?;
            let mut doomed = Vec::with_capacity(target.rows.len());
            for row in &target.rows {
                doomed.push(matches(target, row, predicate)?);
            }
            let before = target.rows.len();
            let mut flags = doomed.into_iter();
            target.rows.retain(|_| !flags.next().unwrap_or(false));
            Ok((before - target.rows.len()) as u64)
        }
    }
}

#[async_trait]
impl SqlExecutor for MemoryExecutor {
    async fn execute(&self, statement: &Statement) -> Result<u64, DbError> {
        match self.run(statement)? {
            Outcome::Affected(n) => Ok(n),
            Outcome::Rows(rows) => Ok(rows.len() as u64),
        }
    }

    async fn query_scalar(&self, statement: &Statement) -> Result<i64, DbError> {
        let rows = self.query_rows(statement).await?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| DbError::UnexpectedResult(format!("{} returned no integer", statement.kind())))
    }

    async fn query_rows(&self, statement: &Statement) -> Result<Vec<Row>, DbError> {
        match self.run(statement)? {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Affected(_) => Ok(Vec::new()),
        }
    }

    async fn commit(&self) -> Result<(), DbError> {
        let mut state = self.lock();
        Self::check_fault(&mut state, "commit")?;
        state.committed = state.working.clone();
        state.commits += 1;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DbError> {
        let mut state = self.lock();
        state.working = state.committed.clone();
        state.rollbacks += 1;
        Ok(())
    }
}
