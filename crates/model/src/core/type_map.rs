//! Static lookup between SQL Server type names and the platform's internal
//! column type tags.

use crate::core::{error::TypeError, vendor_type::VendorType};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Internal type tag the platform uses for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Number,
    String,
    LocalDate,
    LocalTime,
    LocalDateTime,
    OffsetDate,
    OffsetTime,
    OffsetDateTime,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

lazy_static! {
    static ref SQLSERVER_TYPE_MAP: HashMap<&'static str, ColumnType> = build_sqlserver_type_map();
}

impl ColumnType {
    /// Maps a SQL Server type name (as reported by `INFORMATION_SCHEMA`) to
    /// its internal tag.
    pub fn from_sqlserver_type(type_name: &str) -> Result<Self, TypeError> {
        let normalized = type_name.trim().to_uppercase();
        SQLSERVER_TYPE_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| TypeError::UnknownSqlServerType(type_name.to_string()))
    }
}

impl VendorType {
    /// Type used to declare a destination column when only the internal tag
    /// is known.
    pub fn default_for(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Boolean => VendorType::Bit,
            ColumnType::Number => VendorType::FLOAT_DOUBLE,
            ColumnType::String => VendorType::NVarCharMax,
            ColumnType::LocalDate => VendorType::Date,
            ColumnType::LocalTime => VendorType::TIME_FULL,
            ColumnType::LocalDateTime => VendorType::DATETIME2_FULL,
            // SQL Server has no date-with-offset or time-with-offset type.
            ColumnType::OffsetDate | ColumnType::OffsetTime => VendorType::NVarCharMax,
            ColumnType::OffsetDateTime => VendorType::DATETIMEOFFSET_FULL,
        }
    }
}

fn build_sqlserver_type_map() -> HashMap<&'static str, ColumnType> {
    use ColumnType::*;

    let entries = [
        ("BIT", Boolean),
        ("TINYINT", Number),
        ("SMALLINT", Number),
        ("INT", Number),
        ("BIGINT", Number),
        ("DECIMAL", Number),
        ("NUMERIC", Number),
        ("FLOAT", Number),
        ("REAL", Number),
        ("MONEY", Number),
        ("SMALLMONEY", Number),
        ("CHAR", String),
        ("VARCHAR", String),
        ("NCHAR", String),
        ("NVARCHAR", String),
        ("TEXT", String),
        ("NTEXT", String),
        ("UNIQUEIDENTIFIER", String),
        ("XML", String),
        ("DATE", LocalDate),
        ("TIME", LocalTime),
        ("DATETIME", LocalDateTime),
        ("DATETIME2", LocalDateTime),
        ("SMALLDATETIME", LocalDateTime),
        ("DATETIMEOFFSET", OffsetDateTime),
    ];

    entries.into_iter().collect()
}
