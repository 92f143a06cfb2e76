use axum::{Router, routing::get};

use crate::config::Config;
use crate::db::Store;
use crate::handlers::databases::{list_databases_handler, list_tables_handler};
use crate::handlers::records::{
    delete_record_handler, get_record_handler, insert_record_handler, list_records_handler,
    method_not_allowed_handler, replace_record_handler, update_record_handler,
};

#[derive(Clone)]
pub struct SqlitebotState {
    pub store: Store,
}

impl SqlitebotState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(Store::from_config(cfg))
    }
}

pub fn sqlitebot_router(state: SqlitebotState) -> Router {
    Router::new()
        .route("/", get(list_databases_handler))
        .route("/{database}/", get(list_tables_handler))
        .route(
            "/{database}/{table}/",
            get(list_records_handler)
                .post(insert_record_handler)
                .put(method_not_allowed_handler)
                .delete(method_not_allowed_handler),
        )
        .route(
            "/{database}/{table}/{rowid}",
            get(get_record_handler)
                .post(update_record_handler)
                .put(replace_record_handler)
                .delete(delete_record_handler),
        )
        .with_state(state)
}
