//! User administration routes. Platform-master only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::helpers::{require_master, require_principal};
use crate::state::AppState;

/// GET /api/users — list all users.
async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<User>>> {
    let principal = require_principal(&session).await?;
    require_master(&state, &principal).await?;

    Ok(Json(state.store().list_users().await?))
}

/// DELETE /api/users/{id} — delete a user; their grants cascade and blogs
/// they owned remain, ownerless.
async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let principal = require_principal(&session).await?;
    require_master(&state, &principal).await?;

    if !state.access().delete_user(id).await? {
        return Err(AppError::NotFound);
    }

    info!(user_id = id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Create the user administration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", delete(delete_user))
}
