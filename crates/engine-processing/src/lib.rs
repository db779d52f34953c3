pub mod consumer;
pub mod error;
pub mod retry;
