use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SqlitebotError {
    #[error("no such database: {0}")]
    NoSuchDatabase(String),

    #[error("no such table: {0}")]
    NoSuchTable(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("method not allowed without a row id")]
    MethodNotAllowed,

    #[error("expected {expected} values, got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl SqlitebotError {
    pub fn status(&self) -> StatusCode {
        match self {
            SqlitebotError::NoSuchDatabase(_)
            | SqlitebotError::NoSuchTable(_)
            | SqlitebotError::InvalidName(_) => StatusCode::NOT_FOUND,
            SqlitebotError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            SqlitebotError::ValueCount { .. } => StatusCode::BAD_REQUEST,
            SqlitebotError::Database(_) | SqlitebotError::Io(_) | SqlitebotError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SqlitebotError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            SqlitebotError::NoSuchDatabase(_) => ApiErrorBody {
                code: "NO_SUCH_DATABASE".to_string(),
                message: self.to_string(),
            },
            SqlitebotError::NoSuchTable(_) => ApiErrorBody {
                code: "NO_SUCH_TABLE".to_string(),
                message: self.to_string(),
            },
            SqlitebotError::InvalidName(_) => ApiErrorBody {
                code: "INVALID_NAME".to_string(),
                message: self.to_string(),
            },
            SqlitebotError::MethodNotAllowed => ApiErrorBody {
                code: "METHOD_NOT_ALLOWED".to_string(),
                message: self.to_string(),
            },
            SqlitebotError::ValueCount { .. } => ApiErrorBody {
                code: "BAD_REQUEST".to_string(),
                message: self.to_string(),
            },
            SqlitebotError::Database(_) | SqlitebotError::Io(_) | SqlitebotError::Config(_) => {
                tracing::error!(error = %self, "request failed");
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                }
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
