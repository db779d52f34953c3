use crate::core::vendor_type::{Bound, TypeKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// An argument of a parameterized type falls outside its declared bound.
    #[error("argument {index} of {kind} is {value}, expected {bound}")]
    OutOfBounds {
        kind: TypeKind,
        index: usize,
        value: u32,
        bound: Bound,
    },

    /// Wrong number of arguments for the type kind.
    #[error("{kind} takes {expected} argument(s), got {actual}")]
    Arity {
        kind: TypeKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} scale {scale} exceeds precision {precision}")]
    ScaleExceedsPrecision {
        kind: TypeKind,
        precision: u32,
        scale: u32,
    },

    /// Text that is not the canonical rendering of any known type.
    #[error("unknown vendor type: {0}")]
    Unknown(String),

    /// A catalog type name with no internal column type.
    #[error("unsupported SQL Server column type: {0}")]
    UnknownSqlServerType(String),
}
