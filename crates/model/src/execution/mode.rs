use serde::{Deserialize, Serialize};
use std::fmt;

/// What a session does to the destination table's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Create the destination; refuse to start if it already exists.
    Create,
    /// Swap the destination for the staged data via rename.
    Replace,
    /// Empty the destination in place, keeping indexes and grants.
    Truncate,
    /// Add to whatever the destination already holds.
    Append,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteMode::Create => "create",
            WriteMode::Replace => "replace",
            WriteMode::Truncate => "truncate",
            WriteMode::Append => "append",
        };
        f.write_str(name)
    }
}

/// Phase of a streaming session. Not a destination lifecycle intent: the
/// first commit runs the full write mode (`Replace`), later commits merge
/// (`Append`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpsertMode {
    #[default]
    Replace,
    Append,
}
