//! Authentication routes: session establishment and teardown.
//!
//! `POST /auth/session` is the only place identity enters the system: the
//! identity-provider credential is verified, the resulting principal is
//! resolved to a user (find-or-create) and stored server-side in the
//! session. Everything downstream trusts the session, not the client.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::helpers::require_principal;
use crate::session;
use crate::state::AppState;

/// Session creation request.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Credential issued by the identity provider.
    pub token: String,
}

/// The authenticated user, as returned by session and me endpoints.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    /// Whether the email is on the operator allow-list.
    pub super_admin: bool,
}

/// POST /auth/session — verify a credential and establish a session.
async fn create_session(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateSessionRequest>,
) -> AppResult<Json<SessionResponse>> {
    let Some(principal) = state.verifier().verify(&body.token).await? else {
        return Err(AppError::Unauthenticated);
    };

    let user = state.access().resolve_user(&principal).await?;
    session::store_principal(&session, &principal).await?;

    info!(user_id = user.id, "session established");

    Ok(Json(SessionResponse {
        super_admin: state.access().is_super_admin(&principal.email),
        user,
    }))
}

/// POST /auth/logout — destroy the session.
async fn logout(session: Session) -> AppResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to destroy session: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me — the current user.
async fn me(State(state): State<AppState>, session: Session) -> AppResult<Json<SessionResponse>> {
    let principal = require_principal(&session).await?;
    let user = state.access().resolve_user(&principal).await?;

    Ok(Json(SessionResponse {
        super_admin: state.access().is_super_admin(&principal.email),
        user,
    }))
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
