use axum::{Json, extract::State};

use kodak_types::api::DbStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /test-db: row counts per table.
pub async fn test_db(State(state): State<AppState>) -> Result<Json<DbStatus>, ApiError> {
    let counts = state.run_db(|db| db.entity_counts()).await?;

    Ok(Json(DbStatus {
        status: "Database OK".to_string(),
        users_count: counts.users,
        courses_count: counts.courses,
        lessons_count: counts.lessons,
        progress_count: counts.progress,
        messages_count: counts.messages,
    }))
}
