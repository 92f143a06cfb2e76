use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

/// Column name to value, in column order.
pub type Fields = Map<String, Value>;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// One row plus its row identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub rowid: i64,
    #[serde(flatten)]
    pub columns: Fields,
}

impl Record {
    /// Decode a row selected as `rowid, *`. The first column is always the row
    /// id, whatever name the engine reports for it.
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let rowid: i64 = row.try_get(0)?;
        let mut columns = Fields::new();
        for (index, column) in row.columns().iter().enumerate().skip(1) {
            columns.insert(column.name().to_string(), decode_value(row, index)?);
        }
        Ok(Self { rowid, columns })
    }
}

/// Map the stored value's storage class onto JSON. BLOBs become base64 text.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_info = raw.type_info().into_owned();
    let value = match type_info.name() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => Value::String(STANDARD.encode(row.try_get::<Vec<u8>, _>(index)?)),
        _ => Value::String(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

/// Bind a JSON value as a statement parameter. Arrays and objects are stored
/// as their JSON text.
pub fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => query.bind(i),
            (None, Some(f)) => query.bind(f),
            (None, None) => query.bind(n.to_string()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}
