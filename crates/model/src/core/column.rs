use crate::core::{type_map::ColumnType, vendor_type::VendorType};
use serde::{Deserialize, Serialize};

/// A destination column. The name is raw user input and must go through
/// identifier quoting before it appears in SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub vendor_type: VendorType,
}

impl Column {
    pub fn new(name: impl Into<String>, vendor_type: VendorType) -> Self {
        Self {
            name: name.into(),
            vendor_type,
        }
    }

    /// Column typed with the default SQL Server type for an internal type tag.
    pub fn from_column_type(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, VendorType::default_for(column_type))
    }
}
