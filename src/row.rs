//! Conversion of `soundscape_tile` result rows into JSON feature rows.
//!
//! The row schema belongs to the server-side function, so columns are
//! decoded from the type metadata sent with the result set instead of a
//! compile-time struct. Every column passes through: types without a JSON
//! mapping are emitted as their text form, or hex when sent as binary.
use serde_json::{Map, Number, Value};

use sqlx::postgres::types::PgHstore;
use sqlx::postgres::{PgRow, PgValueFormat};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, Uuid};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::tile::FeatureRow;

/// How a column's value is turned into JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Char,
    Json,
    Hstore,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    BoolArray,
    Int2Array,
    Int4Array,
    Int8Array,
    Float8Array,
    TextArray,
    /// Anything else, e.g. PostGIS geometries.
    Raw,
}

impl ColumnKind {
    /// Maps a type name as reported by the server (e.g. `INT8[]`) to a kind.
    pub fn from_type_name(name: &str) -> ColumnKind {
        match name {
            "BOOL" => ColumnKind::Bool,
            "INT2" => ColumnKind::Int2,
            "INT4" => ColumnKind::Int4,
            "INT8" => ColumnKind::Int8,
            "FLOAT4" => ColumnKind::Float4,
            "FLOAT8" => ColumnKind::Float8,
            "NUMERIC" => ColumnKind::Numeric,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => ColumnKind::Text,
            "\"CHAR\"" => ColumnKind::Char,
            "JSON" | "JSONB" => ColumnKind::Json,
            "hstore" => ColumnKind::Hstore,
            "UUID" => ColumnKind::Uuid,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "TIMESTAMPTZ" => ColumnKind::TimestampTz,
            "BOOL[]" => ColumnKind::BoolArray,
            "INT2[]" => ColumnKind::Int2Array,
            "INT4[]" => ColumnKind::Int4Array,
            "INT8[]" => ColumnKind::Int8Array,
            "FLOAT8[]" => ColumnKind::Float8Array,
            "TEXT[]" | "VARCHAR[]" => ColumnKind::TextArray,
            _ => ColumnKind::Raw,
        }
    }
}

/// Converts a result row into a map of column name to value, in column order.
pub fn feature_row(row: &PgRow) -> Result<FeatureRow, sqlx::Error> {
    let mut feature = FeatureRow::new();

    for (index, column) in row.columns().iter().enumerate() {
        let kind = ColumnKind::from_type_name(column.type_info().name());
        let value = decode_column(row, index, kind)?;
        feature.insert(column.name().to_owned(), value);
    }

    Ok(feature)
}

fn decode_column(row: &PgRow, index: usize, kind: ColumnKind) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    // Non-finite floats have no JSON representation and become null.
    let value = match kind {
        ColumnKind::Bool => Value::from(row.try_get::<bool, _>(index)?),
        ColumnKind::Int2 => Value::from(row.try_get::<i16, _>(index)?),
        ColumnKind::Int4 => Value::from(row.try_get::<i32, _>(index)?),
        ColumnKind::Int8 => Value::from(row.try_get::<i64, _>(index)?),
        ColumnKind::Float4 => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        ColumnKind::Float8 => Value::from(row.try_get::<f64, _>(index)?),
        // NaN and out-of-range numerics don't fit a Decimal
        ColumnKind::Numeric => match row.try_get::<Decimal, _>(index) {
            Ok(decimal) => decimal_value(decimal),
            Err(_) => raw_value(row, index)?,
        },
        ColumnKind::Text => Value::from(row.try_get::<String, _>(index)?),
        ColumnKind::Char => {
            let byte = row.try_get::<i8, _>(index)? as u8;
            Value::from(char::from(byte).to_string())
        }
        ColumnKind::Json => row.try_get::<Value, _>(index)?,
        ColumnKind::Hstore => hstore_value(row.try_get::<PgHstore, _>(index)?),
        ColumnKind::Uuid => Value::from(row.try_get::<Uuid, _>(index)?.to_string()),
        ColumnKind::Date => Value::from(row.try_get::<NaiveDate, _>(index)?.to_string()),
        ColumnKind::Time => Value::from(row.try_get::<NaiveTime, _>(index)?.to_string()),
        ColumnKind::Timestamp => Value::from(
            row.try_get::<NaiveDateTime, _>(index)?
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        ),
        ColumnKind::TimestampTz => {
            Value::from(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339())
        }
        ColumnKind::BoolArray => Value::from(row.try_get::<Vec<bool>, _>(index)?),
        ColumnKind::Int2Array => Value::from(row.try_get::<Vec<i16>, _>(index)?),
        ColumnKind::Int4Array => Value::from(row.try_get::<Vec<i32>, _>(index)?),
        ColumnKind::Int8Array => Value::from(row.try_get::<Vec<i64>, _>(index)?),
        ColumnKind::Float8Array => Value::from(row.try_get::<Vec<f64>, _>(index)?),
        ColumnKind::TextArray => Value::from(row.try_get::<Vec<String>, _>(index)?),
        ColumnKind::Raw => raw_value(row, index)?,
    };

    Ok(value)
}

/// The value as the server sent it: text as-is, binary as lowercase hex.
/// PostGIS geometries come out as hex EWKB, same as their text output.
fn raw_value(row: &PgRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;

    let text = match raw.format() {
        PgValueFormat::Text => raw.as_str().map_err(sqlx::Error::Decode)?.to_owned(),
        PgValueFormat::Binary => hex::encode(raw.as_bytes().map_err(sqlx::Error::Decode)?),
    };

    Ok(Value::from(text))
}

fn decimal_value(decimal: Decimal) -> Value {
    let text = decimal.to_string();
    match text.parse::<Number>() {
        Ok(number) => Value::Number(number),
        Err(_) => Value::from(text),
    }
}

fn hstore_value(hstore: PgHstore) -> Value {
    let map: Map<String, Value> = hstore
        .0
        .into_iter()
        .map(|(key, value)| (key, value.map_or(Value::Null, Value::from)))
        .collect();

    Value::Object(map)
}
