use model::pagination::offset::Offset;
use planner::query::{
    ast::{common::TableRef, select::Select, statement::Statement},
    offsets::{OffsetError, incremental_select},
};

pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// An incremental read of a whole table, resuming at an optional offset and
/// handed back in batches.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadQuery {
    pub select: Select,
    pub batch_size: usize,
}

impl ReadQuery {
    /// Fails before anything reaches the database when the offset cannot be
    /// expressed as a predicate.
    pub fn new(table: TableRef, offset: Option<&Offset>) -> Result<Self, OffsetError> {
        Ok(Self {
            select: incremental_select(table, offset)?,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn statement(&self) -> Statement {
        Statement::Select(self.select.clone())
    }
}
