//! Shared route helpers: authentication and access gates.

use tower_sessions::Session;

use crate::access::AccessDecision;
use crate::auth::Principal;
use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::session;
use crate::state::AppState;

/// Require an authenticated principal, or fail with 401.
///
/// The access-control core is never consulted for unauthenticated
/// requests; callers stop here first.
pub async fn require_principal(session: &Session) -> AppResult<Principal> {
    match session::load_principal(session).await? {
        Some(principal) => Ok(principal),
        None => Err(AppError::Unauthenticated),
    }
}

/// Gate a blog-scoped operation at `required`.
///
/// Returns the granted decision; denials become the matching 403/404.
/// Storage faults pass through as 5xx, never as a denial.
pub async fn require_access(
    state: &AppState,
    principal: &Principal,
    blog_id: i64,
    required: Role,
) -> AppResult<AccessDecision> {
    let decision = state
        .access()
        .check_access(principal, blog_id, required)
        .await?;

    if !decision.granted {
        return Err(AppError::from_denied(&decision));
    }

    Ok(decision)
}

/// Require platform-wide master: an allow-listed email or a stored
/// master role.
pub async fn require_master(state: &AppState, principal: &Principal) -> AppResult<()> {
    if state.access().is_super_admin(&principal.email) {
        return Ok(());
    }

    let user = state.access().resolve_user(principal).await?;
    if user.role.is_master() {
        return Ok(());
    }

    Err(AppError::Forbidden)
}
