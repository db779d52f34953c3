use crate::error::PipelineError;
use async_trait::async_trait;

pub mod components;
pub mod staging;
pub mod upsert;

/// Counters of one finished write session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub batches: usize,
    pub rows: u64,
    pub deleted_keys: usize,
    pub commits: usize,
}

#[async_trait]
pub trait DataConsumer {
    /// Executes the consumer's main loop.
    async fn run(&mut self) -> Result<SessionReport, PipelineError>;
}
