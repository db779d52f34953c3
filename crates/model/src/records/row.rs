use crate::core::value::Value;

/// Values of one record, positionally matching the destination column list.
pub type Row = Vec<Value>;
