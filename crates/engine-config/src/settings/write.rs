use connectors::sql::{base::destination::DEFAULT_SCHEMA, mssql::temp_table::DEFAULT_STAGING_PREFIX};
use model::{core::type_map::ColumnType, execution::mode::WriteMode};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WriteSettings {
    pub mode: WriteMode,
    /// Resource path segments: `["orders"]` or `["sales", "orders"]`.
    pub path: Vec<String>,
    pub columns: Vec<ColumnSetting>,
    #[serde(default)]
    pub id_column: Option<String>,
    #[serde(default)]
    pub filter_column: Option<String>,
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,
    #[serde(default = "default_schema")]
    pub default_schema: String,
}

/// A column given either with an explicit SQL Server type
/// (`"type": "NVARCHAR(255)"`) or an internal type tag mapped to its
/// default SQL Server type (`"column_type": "Number"`).
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSetting {
    pub name: String,
    #[serde(rename = "type", default)]
    pub vendor_type: Option<String>,
    #[serde(default)]
    pub column_type: Option<ColumnType>,
}

fn default_staging_prefix() -> String {
    DEFAULT_STAGING_PREFIX.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}
