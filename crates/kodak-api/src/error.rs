use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use kodak_db::DbError;
use kodak_types::api::ErrorBody;

/// Failures a handler can end with. Domain outcomes such as bad form input or
/// a taken email are answered with a redirect and notice instead, so they
/// only show up here while a handler decides what to do with them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("duplicate {0}")]
    Conflict(&'static str),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A path id that is not a valid integer key. Answered like `NotFound`.
    #[error("malformed {entity} id {raw:?}")]
    MalformedId { entity: &'static str, raw: String },

    #[error("internal server error")]
    Internal,
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateKey { entity } => Self::Conflict(entity),
            DbError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => {
                error!("Database error: {}", other);
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Conflict(entity) => (StatusCode::CONFLICT, format!("{entity} already exists")),
            Self::NotFound { entity, .. } | Self::MalformedId { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
