//! Defines the `Dialect` trait for database-specific SQL syntax.

use chrono::Timelike;
use model::core::{
    utils::{encode_hex, quote_nstring},
    value::Value,
    vendor_type::VendorType,
};

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect, escaping any embedded closing quote.
    ///
    /// - SQL Server uses brackets: `[my_column]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a vendor column type as it appears in DDL.
    fn render_data_type(&self, data_type: &VendorType) -> String;

    /// Renders a value as an inline SQL literal.
    fn render_literal(&self, value: &Value) -> String;

    /// Returns the name of the dialect (e.g., "SQL Server").
    fn name(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn render_data_type(&self, data_type: &VendorType) -> String {
        data_type.render()
    }

    fn render_literal(&self, value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            // Exponent form parses as FLOAT; positional text would be read as
            // NUMERIC, which caps at 38 digits.
            Value::Float(v) if v.is_finite() => format!("{v:e}"),
            Value::Float(_) => "NULL".into(),
            Value::Decimal(v) => v.to_plain_string(),
            Value::String(v) => quote_nstring(v),
            Value::Boolean(v) => if *v { "1" } else { "0" }.into(),
            Value::Uuid(v) => quote_nstring(&v.to_string()),
            Value::Bytes(v) => encode_hex(v),
            Value::Date(v) => quote_nstring(&v.format("%Y-%m-%d").to_string()),
            Value::Time(v) => {
                let text = format!("{}{}", v.format("%H:%M:%S"), fraction(v.nanosecond()));
                quote_nstring(&text)
            }
            // DATETIME and SMALLDATETIME columns reject more than three
            // fractional digits in text, but convert from DATETIME2.
            Value::DateTime(v) => {
                let text = format!("{}{}", v.format("%Y-%m-%dT%H:%M:%S"), fraction(v.nanosecond()));
                format!("CAST({} AS DATETIME2(7))", quote_nstring(&text))
            }
            Value::DateTimeOffset(v) => {
                let text = format!(
                    "{}{}{}",
                    v.format("%Y-%m-%dT%H:%M:%S"),
                    fraction(v.nanosecond()),
                    v.format("%:z")
                );
                quote_nstring(&text)
            }
            Value::Null => "NULL".into(),
        }
    }

    fn name(&self) -> String {
        "SQL Server".into()
    }
}

/// Fractional seconds at SQL Server's 100ns resolution, trailing zeros cut.
fn fraction(nanos: u32) -> String {
    // chrono encodes a leap second as nanos past 1_000_000_000.
    let ticks = (nanos % 1_000_000_000) / 100;
    if ticks == 0 {
        return String::new();
    }
    format!(".{ticks:07}").trim_end_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_quote_identifier_escapes_brackets() {
        assert_eq!(SqlServer.quote_identifier("orders"), "[orders]");
        assert_eq!(SqlServer.quote_identifier("we]ird"), "[we]]ird]");
        assert_eq!(
            SqlServer.quote_identifier("x]; DROP TABLE y; --"),
            "[x]]; DROP TABLE y; --]"
        );
    }

    #[test]
    fn test_render_literals() {
        let d = SqlServer;
        assert_eq!(d.render_literal(&Value::Int(-5)), "-5");
        assert_eq!(d.render_literal(&Value::Boolean(true)), "1");
        assert_eq!(d.render_literal(&Value::String("it's".into())), "N'it''s'");
        assert_eq!(d.render_literal(&Value::Bytes(vec![1, 171])), "0x01ab");
        assert_eq!(d.render_literal(&Value::Null), "NULL");
        assert_eq!(d.render_literal(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(
            d.render_literal(&Value::Decimal(BigDecimal::from_str("12.50").unwrap())),
            "12.50"
        );

        let dt = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        assert_eq!(
            d.render_literal(&Value::DateTime(dt)),
            "CAST(N'2023-12-31T23:59:01' AS DATETIME2(7))"
        );
    }

    #[test]
    fn test_float_literals_use_exponent_form() {
        let d = SqlServer;
        assert_eq!(d.render_literal(&Value::Float(1e40)), "1e40");
        assert_eq!(d.render_literal(&Value::Float(1e-45)), "1e-45");
        assert_eq!(d.render_literal(&Value::Float(-2.5)), "-2.5e0");
        assert_eq!(d.render_literal(&Value::Float(0.0)), "0e0");
        assert!(d.render_literal(&Value::Float(f64::MAX)).len() < 38);
    }

    #[test]
    fn test_temporal_fractions_fit_sqlserver() {
        let d = SqlServer;
        let dt = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_nano_opt(7, 8, 9, 123_456_789)
            .unwrap();
        assert_eq!(
            d.render_literal(&Value::DateTime(dt)),
            "CAST(N'2024-05-06T07:08:09.1234567' AS DATETIME2(7))"
        );
        assert_eq!(
            d.render_literal(&Value::Time(dt.time())),
            "N'07:08:09.1234567'"
        );

        let millis = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_milli_opt(7, 8, 9, 250)
            .unwrap();
        assert_eq!(
            d.render_literal(&Value::DateTime(millis)),
            "CAST(N'2024-05-06T07:08:09.25' AS DATETIME2(7))"
        );

        let offset = chrono::FixedOffset::east_opt(-3 * 3600).unwrap();
        let dto = millis.and_local_timezone(offset).unwrap();
        assert_eq!(
            d.render_literal(&Value::DateTimeOffset(dto)),
            "N'2024-05-06T07:08:09.25-03:00'"
        );
    }
}
