//! Decoding of MySQL rows into untyped records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Decode, MySql, Row, Type, TypeInfo, ValueRef};

use crate::models::Record;
use crate::{Error, Result};

/// Decode every column of `row`, keyed by column name (or alias).
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Record> {
    let mut record = Record::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

/// How a column's value is read, by MySQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    /// `YEAR` arrives unsigned and does not decode as a signed integer.
    Year,
    Float,
    Double,
    Decimal,
    DateTime,
    Timestamp,
    Date,
    Time,
    Json,
    Text,
}

impl ColumnKind {
    fn classify(type_name: &str) -> Self {
        match type_name {
            "BOOLEAN" => Self::Bool,
            "YEAR" => Self::Year,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => Self::Signed,
            t if t.ends_with("UNSIGNED") => Self::Unsigned,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "DECIMAL" => Self::Decimal,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "JSON" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Result<JsonValue> {
    let raw = row.try_get_raw(idx).map_err(|e| shape_error(idx, e))?;
    if raw.is_null() {
        return Ok(JsonValue::Null);
    }

    let value = match ColumnKind::classify(type_name) {
        ColumnKind::Bool => JsonValue::Bool(get::<bool>(row, idx)?),
        ColumnKind::Signed => JsonValue::from(get::<i64>(row, idx)?),
        ColumnKind::Unsigned => JsonValue::from(get::<u64>(row, idx)?),
        ColumnKind::Year => JsonValue::from(get::<u16>(row, idx)?),
        ColumnKind::Float => JsonValue::from(f64::from(get::<f32>(row, idx)?)),
        ColumnKind::Double => JsonValue::from(get::<f64>(row, idx)?),
        // Kept as text: converting to f64 would lose precision.
        ColumnKind::Decimal => JsonValue::String(get::<Decimal>(row, idx)?.to_string()),
        ColumnKind::DateTime => JsonValue::String(
            get::<NaiveDateTime>(row, idx)?
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        ),
        ColumnKind::Timestamp => JsonValue::String(get::<DateTime<Utc>>(row, idx)?.to_rfc3339()),
        ColumnKind::Date => JsonValue::String(get::<NaiveDate>(row, idx)?.to_string()),
        ColumnKind::Time => JsonValue::String(get::<NaiveTime>(row, idx)?.to_string()),
        ColumnKind::Json => get::<JsonValue>(row, idx)?,
        ColumnKind::Text => decode_text(row, idx)?,
    };
    Ok(value)
}

/// Character columns, then binary columns rendered lossily.
fn decode_text(row: &MySqlRow, idx: usize) -> Result<JsonValue> {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Ok(JsonValue::String(s));
    }
    let bytes = get::<Vec<u8>>(row, idx)?;
    Ok(JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()))
}

fn get<'r, T>(row: &'r MySqlRow, idx: usize) -> Result<T>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get::<T, _>(idx).map_err(|e| shape_error(idx, e))
}

fn shape_error(idx: usize, err: sqlx::Error) -> Error {
    Error::RowShape(format!("column {}: {}", idx, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_decoded_unsigned() {
        assert_eq!(ColumnKind::classify("YEAR"), ColumnKind::Year);
        assert_ne!(ColumnKind::classify("YEAR"), ColumnKind::Signed);
    }

    #[test]
    fn integer_signedness_follows_the_type_name() {
        for name in ["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "BIGINT"] {
            assert_eq!(ColumnKind::classify(name), ColumnKind::Signed, "{name}");
        }
        for name in ["TINYINT UNSIGNED", "INT UNSIGNED", "BIGINT UNSIGNED"] {
            assert_eq!(ColumnKind::classify(name), ColumnKind::Unsigned, "{name}");
        }
        assert_eq!(ColumnKind::classify("BOOLEAN"), ColumnKind::Bool);
    }

    #[test]
    fn unknown_types_fall_back_to_text() {
        for name in ["VARCHAR", "TEXT", "CHAR", "ENUM", "BLOB", "GEOMETRY"] {
            assert_eq!(ColumnKind::classify(name), ColumnKind::Text, "{name}");
        }
        assert_eq!(ColumnKind::classify("DECIMAL"), ColumnKind::Decimal);
        assert_eq!(ColumnKind::classify("TIMESTAMP"), ColumnKind::Timestamp);
    }
}
