//! Turns a resume offset into the predicate of an incremental read.

use crate::query::{
    ast::{
        common::TableRef,
        expr::{BinaryOperator, Expr},
        select::Select,
    },
    builder::select::SelectBuilder,
    dialect::Dialect,
    ident,
    renderer::{Render, Renderer},
    value,
};
use model::{
    core::value::Value,
    pagination::offset::{Offset, OffsetKey, PathSegment, TemporalKey},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffsetError {
    /// Offsets produced outside this connector cannot be resumed from.
    #[error("external offsets are not supported")]
    ExternalUnsupported,

    #[error("offset path must be a single field, got {0}")]
    UnsupportedPath(String),

    #[error("offset key of kind {0} is not supported")]
    UnsupportedKey(&'static str),
}

/// Builds `<column> >= <key>` for an offset.
pub fn offset_predicate(offset: &Offset) -> Result<Expr, OffsetError> {
    let (path, key) = match offset {
        Offset::External(_) => return Err(OffsetError::ExternalUnsupported),
        Offset::Internal { path, key } => (path, key),
    };

    let column = match path.as_slice() {
        [PathSegment::Field(name)] => name,
        _ => return Err(OffsetError::UnsupportedPath(describe_path(path))),
    };

    let literal = match key {
        OffsetKey::Int(n) => Value::Int(*n),
        OffsetKey::String(s) => Value::String(s.clone()),
        // Unreachable through the type map, which never yields an offset date.
        OffsetKey::Temporal(t @ TemporalKey::OffsetDate { .. }) => {
            return Err(OffsetError::UnsupportedKey(t.name()));
        }
        OffsetKey::Temporal(t) => Value::String(t.to_string()),
    };

    Ok(Expr::binary(ident(column), BinaryOperator::GtEq, value(literal)))
}

/// Renders the offset predicate as a SQL fragment for a `WHERE` clause.
pub fn offset_fragment(dialect: &dyn Dialect, offset: &Offset) -> Result<String, OffsetError> {
    let predicate = offset_predicate(offset)?;
    let mut renderer = Renderer::new(dialect);
    predicate.render(&mut renderer);
    Ok(renderer.finish())
}

/// `SELECT * FROM table`, resuming at `offset` when one is given.
pub fn incremental_select(table: TableRef, offset: Option<&Offset>) -> Result<Select, OffsetError> {
    let mut builder = SelectBuilder::new().from(table);
    if let Some(offset) = offset {
        builder = builder.where_clause(offset_predicate(offset)?);
    }
    Ok(builder.build())
}

fn describe_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "an empty path".to_string();
    }

    path.iter()
        .map(|seg| match seg {
            PathSegment::Field(name) => format!(".{name}"),
            PathSegment::Index(i) => format!("[{i}]"),
        })
        .collect()
}
