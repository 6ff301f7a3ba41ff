//! Blog management routes.
//!
//! Required roles: reads need `editor`, destructive and ownership
//! operations need `owner`. Creation only needs an authenticated caller,
//! who becomes the designated owner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Blog, NewBlog, Role};
use crate::routes::helpers::{require_access, require_principal};
use crate::state::AppState;

/// Blog creation request.
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub name: String,
    pub domain: Option<String>,
}

/// Ownership transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferOwnerRequest {
    pub user_id: i64,
}

/// POST /api/blogs — create a blog owned by the caller.
async fn create_blog(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateBlogRequest>,
) -> AppResult<(StatusCode, Json<Blog>)> {
    let principal = require_principal(&session).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("blog name must not be empty".into()));
    }

    let user = state.access().resolve_user(&principal).await?;
    let blog = state
        .store()
        .insert_blog(&NewBlog {
            name: body.name,
            domain: body.domain,
            owner_id: Some(user.id),
        })
        .await?;

    info!(blog_id = blog.id, owner_id = user.id, "blog created");

    Ok((StatusCode::CREATED, Json(blog)))
}

/// GET /api/blogs — blogs the caller owns or holds a grant on; all blogs
/// for platform operators.
async fn list_blogs(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Blog>>> {
    let principal = require_principal(&session).await?;

    if state.access().is_super_admin(&principal.email) {
        return Ok(Json(state.store().list_blogs().await?));
    }

    let user = state.access().resolve_user(&principal).await?;
    if user.role.is_master() {
        return Ok(Json(state.store().list_blogs().await?));
    }

    Ok(Json(state.store().list_blogs_for_user(user.id).await?))
}

/// GET /api/blogs/{id} — requires `editor`.
async fn get_blog(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<Blog>> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Editor).await?;

    // Masters are granted without a blog lookup; the load itself answers
    // whether the blog exists.
    let blog = state.store().find_blog(id).await?.ok_or(AppError::NotFound)?;

    Ok(Json(blog))
}

/// DELETE /api/blogs/{id} — requires `owner`; grants cascade.
async fn delete_blog(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Owner).await?;

    if !state.access().delete_blog(id).await? {
        return Err(AppError::NotFound);
    }

    info!(blog_id = id, "blog deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/blogs/{id}/owner — requires `owner`; reassigns ownership.
async fn transfer_owner(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(body): Json<TransferOwnerRequest>,
) -> AppResult<Json<Blog>> {
    let principal = require_principal(&session).await?;
    require_access(&state, &principal, id, Role::Owner).await?;

    if state.store().find_user_by_id(body.user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    if !state.access().transfer_ownership(id, body.user_id).await? {
        return Err(AppError::NotFound);
    }

    info!(blog_id = id, new_owner_id = body.user_id, "ownership transferred");

    let blog = state.store().find_blog(id).await?.ok_or(AppError::NotFound)?;

    Ok(Json(blog))
}

/// Create the blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/blogs", get(list_blogs).post(create_blog))
        .route("/api/blogs/{id}", get(get_blog).delete(delete_blog))
        .route("/api/blogs/{id}/owner", put(transfer_owner))
}
