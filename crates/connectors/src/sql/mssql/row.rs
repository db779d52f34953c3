//! Conversion of driver rows into values.

use bigdecimal::{BigDecimal, num_bigint::BigInt};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::{core::value::Value, records::row::Row};
use tiberius::ColumnData;
use uuid::Uuid;

fn convert_column_data(data: &ColumnData<'_>) -> Value {
    match data {
        ColumnData::Bit(Some(b)) => Value::Boolean(*b),
        ColumnData::U8(Some(v)) => Value::Int(*v as i64),
        ColumnData::I16(Some(v)) => Value::Int(*v as i64),
        ColumnData::I32(Some(v)) => Value::Int(*v as i64),
        ColumnData::I64(Some(v)) => Value::Int(*v),
        ColumnData::F32(Some(v)) => Value::Float(*v as f64),
        ColumnData::F64(Some(v)) => Value::Float(*v),
        ColumnData::Numeric(Some(n)) => {
            Value::Decimal(BigDecimal::new(BigInt::from(n.value()), n.scale() as i64))
        }
        ColumnData::String(Some(s)) => Value::String(s.to_string()),
        ColumnData::Guid(Some(g)) => Value::Uuid(Uuid::from_u128(g.as_u128())),
        ColumnData::Binary(Some(b)) => Value::Bytes(b.to_vec()),
        ColumnData::Xml(Some(xml)) => Value::String(xml.to_string()),
        _ => Value::Null,
    }
}

/// Temporal cells go through chrono's typed getters; everything else is
/// converted from the raw column data.
pub fn convert_row(row: &tiberius::Row) -> Row {
    row.cells()
        .enumerate()
        .map(|(i, (_col, data))| match data {
            ColumnData::DateTime(Some(_))
            | ColumnData::SmallDateTime(Some(_))
            | ColumnData::DateTime2(Some(_)) => row
                .try_get::<NaiveDateTime, _>(i)
                .ok()
                .flatten()
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            ColumnData::DateTimeOffset(Some(_)) => row
                .try_get::<DateTime<Utc>, _>(i)
                .ok()
                .flatten()
                .map(|dt| Value::DateTimeOffset(dt.fixed_offset()))
                .unwrap_or(Value::Null),
            ColumnData::Date(Some(_)) => row
                .try_get::<NaiveDate, _>(i)
                .ok()
                .flatten()
                .map(Value::Date)
                .unwrap_or(Value::Null),
            ColumnData::Time(Some(_)) => row
                .try_get::<NaiveTime, _>(i)
                .ok()
                .flatten()
                .map(Value::Time)
                .unwrap_or(Value::Null),
            _ => convert_column_data(data),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::str::FromStr;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert_column_data(&ColumnData::Bit(Some(true))), Value::Boolean(true));
        assert_eq!(convert_column_data(&ColumnData::I32(Some(-3))), Value::Int(-3));
        assert_eq!(
            convert_column_data(&ColumnData::String(Some(Cow::Borrowed("abc")))),
            Value::String("abc".into())
        );
        assert_eq!(convert_column_data(&ColumnData::I64(None)), Value::Null);
    }

    #[test]
    fn test_convert_numeric_keeps_scale() {
        let numeric = tiberius::numeric::Numeric::new_with_scale(12345, 2);
        assert_eq!(
            convert_column_data(&ColumnData::Numeric(Some(numeric))),
            Value::Decimal(BigDecimal::from_str("123.45").unwrap())
        );
    }
}
