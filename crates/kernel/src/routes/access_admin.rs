//! Access administration routes: grants, revocations, and the raw
//! decision endpoint.
//!
//! Listing a blog's grants needs `admin`; changing them needs `owner`.
//! Grant bodies deserialize into [`GrantRole`], so `owner` and `master`
//! never reach the grant path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::access::AccessDecision;
use crate::error::{AppError, AppResult};
use crate::models::{BlogAccess, GrantRole, Role};
use crate::routes::helpers::{require_access, require_principal};
use crate::state::AppState;

/// Grant request body.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub role: GrantRole,
}

/// Decision check request body.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub blog_id: i64,
    pub required_role: Role,
}

/// GET /api/blogs/{id}/access — list a blog's grants. Requires `admin`.
async fn list_access(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<BlogAccess>>> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Admin).await?;

    Ok(Json(state.store().list_access_for_blog(id).await?))
}

/// PUT /api/blogs/{id}/access/{user_id} — grant or overwrite a role.
/// Requires `owner`.
async fn grant_access(
    State(state): State<AppState>,
    session: Session,
    Path((id, user_id)): Path<(i64, i64)>,
    Json(body): Json<GrantRequest>,
) -> AppResult<Json<BlogAccess>> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Owner).await?;

    if state.store().find_user_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let row = state.access().grant(user_id, id, body.role).await?;

    info!(blog_id = id, user_id, role = %row.role, "access granted");

    Ok(Json(row))
}

/// DELETE /api/blogs/{id}/access/{user_id} — revoke a grant. Requires
/// `owner`. Idempotent: revoking an absent grant still returns 204.
async fn revoke_access(
    State(state): State<AppState>,
    session: Session,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Owner).await?;

    let existed = state.access().revoke(user_id, id).await?;
    if existed {
        info!(blog_id = id, user_id, "access revoked");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/access/check — the caller's raw decision for a blog.
///
/// Surfaces the decision itself (granted flag, effective role, deny
/// reason) so the admin UI can tailor its affordances; the denial is data
/// here, not an error status.
async fn check_access(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CheckRequest>,
) -> AppResult<Json<AccessDecision>> {
    let principal = require_principal(&session).await?;

    let decision = state
        .access()
        .check_access(&principal, body.blog_id, body.required_role)
        .await?;

    Ok(Json(decision))
}

/// Create the access administration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/blogs/{id}/access", get(list_access))
        .route(
            "/api/blogs/{id}/access/{user_id}",
            put(grant_access).delete(revoke_access),
        )
        .route("/api/access/check", post(check_access))
}
