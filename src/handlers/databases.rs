use axum::{
    Json,
    extract::{Path, State},
};

use crate::{SqlitebotError, router::SqlitebotState};

/// GET / -> every database file in the data root.
pub async fn list_databases_handler(
    State(state): State<SqlitebotState>,
) -> Result<Json<Vec<String>>, SqlitebotError> {
    Ok(Json(state.store.list_databases().await?))
}

/// GET /{database}/ -> table names, alphabetical.
pub async fn list_tables_handler(
    State(state): State<SqlitebotState>,
    Path(database): Path<String>,
) -> Result<Json<Vec<String>>, SqlitebotError> {
    Ok(Json(state.store.list_tables(&database).await?))
}
