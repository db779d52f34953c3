use crate::settings::{
    Settings, error::SettingsError, validated::ValidatedSettings, write::ColumnSetting,
};
use connectors::sql::base::destination::Destination;
use model::core::{column::Column, identifiers::ResourcePath, vendor_type::VendorType};
use std::collections::HashSet;
use tracing::{info, warn};

/// Checks settings before anything connects, collecting every problem
/// instead of stopping at the first.
pub struct SettingsValidator<'a> {
    settings: &'a Settings,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        let mut errors: Vec<String> = Vec::new();

        let columns = self.validate_columns(&mut errors);
        self.validate_key_columns(&columns, &mut errors);
        self.validate_batch_size(&mut errors);
        self.validate_retry(&mut errors);

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        let write = &self.settings.write;
        let destination = Destination::new(
            ResourcePath::new(write.path.iter().cloned()),
            &write.default_schema,
            columns,
        )?
        .with_id_column(write.id_column.clone())
        .with_filter_column(write.filter_column.clone());

        let validated = ValidatedSettings {
            connection: self.settings.connection.to_options()?,
            destination,
            mode: write.mode,
            staging_prefix: write.staging_prefix.clone(),
            retry: self.settings.retry.to_policy(),
            batch_size: self.settings.read.batch_size,
        };

        info!(
            path = %validated.destination.path,
            mode = %validated.mode,
            columns = validated.destination.columns.len(),
            "Settings validation completed successfully"
        );
        Ok(validated)
    }

    fn validate_columns(&self, errors: &mut Vec<String>) -> Vec<Column> {
        let specs = &self.settings.write.columns;
        if specs.is_empty() {
            errors.push("write.columns must not be empty".to_string());
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.name.is_empty() {
                errors.push("column names must not be empty".to_string());
                continue;
            }
            if !seen.insert(spec.name.as_str()) {
                errors.push(format!("column {} is listed twice", spec.name));
                continue;
            }
            match column_from_setting(spec) {
                Ok(column) => columns.push(column),
                Err(e) => errors.push(e),
            }
        }
        columns
    }

    fn validate_key_columns(&self, columns: &[Column], errors: &mut Vec<String>) {
        let write = &self.settings.write;
        let known = |name: &str| columns.iter().any(|c| c.name == name);

        if let Some(id) = &write.id_column
            && !known(id)
        {
            errors.push(format!("id_column {id} is not one of the columns"));
        }
        if let Some(filter) = &write.filter_column
            && !known(filter)
        {
            errors.push(format!("filter_column {filter} is not one of the columns"));
        }
    }

    fn validate_batch_size(&self, errors: &mut Vec<String>) {
        let batch_size = self.settings.read.batch_size;
        if batch_size == 0 {
            errors.push("read.batch_size must be greater than zero".to_string());
        } else if batch_size > 100_000 {
            warn!(
                "Batch size {} is very large, may cause memory issues",
                batch_size
            );
        }
    }

    fn validate_retry(&self, errors: &mut Vec<String>) {
        let retry = &self.settings.retry;
        if retry.max_attempts == 0 {
            errors.push("retry.max_attempts must be at least 1".to_string());
        }
        if retry.max_delay_ms < retry.base_delay_ms {
            errors.push("retry.max_delay_ms must not be below retry.base_delay_ms".to_string());
        }
    }
}

fn column_from_setting(spec: &ColumnSetting) -> Result<Column, String> {
    match (&spec.vendor_type, spec.column_type) {
        (Some(text), _) => text
            .parse::<VendorType>()
            .map(|vendor_type| Column::new(&spec.name, vendor_type))
            .map_err(|e| format!("column {}: {e}", spec.name)),
        (None, Some(column_type)) => Ok(Column::from_column_type(&spec.name, column_type)),
        (None, None) => Err(format!(
            "column {} needs either a type or a column_type",
            spec.name
        )),
    }
}
