use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde_json::Value;
use tracing::info;

use crate::db::Record;
use crate::middleware::FlatForm;
use crate::{SqlitebotError, router::SqlitebotState};

/// GET /{database}/{table}/ -> every record in scan order.
pub async fn list_records_handler(
    State(state): State<SqlitebotState>,
    Path((database, table)): Path<(String, String)>,
) -> Result<Json<Vec<Record>>, SqlitebotError> {
    let records: Vec<Record> = state
        .store
        .all_records(&database, &table)
        .await?
        .try_collect()
        .await?;
    Ok(Json(records))
}

/// GET /{database}/{table}/{rowid} -> the record, or `null`.
pub async fn get_record_handler(
    State(state): State<SqlitebotState>,
    Path((database, table, rowid)): Path<(String, String, i64)>,
) -> Result<Json<Option<Record>>, SqlitebotError> {
    Ok(Json(state.store.get_record(&database, &table, rowid).await?))
}

/// POST /{database}/{table}/ -> 201 with the new record's path.
pub async fn insert_record_handler(
    State(state): State<SqlitebotState>,
    Path((database, table)): Path<(String, String)>,
    FlatForm(fields): FlatForm,
) -> Result<Response, SqlitebotError> {
    let Some(rowid) = state
        .store
        .insert_record(&database, &table, &fields)
        .await?
    else {
        return Ok(Json(Value::Null).into_response());
    };

    let location = format!("/{database}/{table}/{rowid}");
    info!(database = %database, table = %table, rowid, "record created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location.clone())],
        Json(location),
    )
        .into_response())
}

/// POST /{database}/{table}/{rowid} -> set the posted columns.
pub async fn update_record_handler(
    State(state): State<SqlitebotState>,
    Path((database, table, rowid)): Path<(String, String, i64)>,
    FlatForm(fields): FlatForm,
) -> Result<Json<i64>, SqlitebotError> {
    state
        .store
        .update_record(&database, &table, rowid, &fields)
        .await?;
    info!(database = %database, table = %table, rowid, "record updated");
    Ok(Json(rowid))
}

/// PUT /{database}/{table}/{rowid} -> overwrite the row from a JSON array of
/// values in column order.
pub async fn replace_record_handler(
    State(state): State<SqlitebotState>,
    Path((database, table, rowid)): Path<(String, String, i64)>,
    Json(values): Json<Vec<Value>>,
) -> Result<StatusCode, SqlitebotError> {
    state
        .store
        .replace_record(&database, &table, rowid, &values)
        .await?;
    info!(database = %database, table = %table, rowid, "record replaced");
    Ok(StatusCode::OK)
}

/// DELETE /{database}/{table}/{rowid}
pub async fn delete_record_handler(
    State(state): State<SqlitebotState>,
    Path((database, table, rowid)): Path<(String, String, i64)>,
) -> Result<StatusCode, SqlitebotError> {
    state
        .store
        .delete_record(&database, &table, rowid)
        .await?;
    info!(database = %database, table = %table, rowid, "record deleted");
    Ok(StatusCode::OK)
}

/// PUT and DELETE need a row id.
pub async fn method_not_allowed_handler() -> SqlitebotError {
    SqlitebotError::MethodNotAllowed
}
