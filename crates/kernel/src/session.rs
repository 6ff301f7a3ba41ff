//! Session management using Redis.
//!
//! The verified [`Principal`] lives in the server-side session record; the
//! browser holds only an opaque session id. Identity never travels in a
//! client-readable cookie.

use anyhow::{Context, Result};
use fred::prelude::*;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_redis_store::RedisStore;

use crate::auth::Principal;

/// Session expiry on inactivity (24 hours).
pub const SESSION_EXPIRY_HOURS: i64 = 24;

/// Session key holding the authenticated principal.
pub const SESSION_PRINCIPAL: &str = "principal";

/// Create the session layer using Redis as the backend.
pub async fn create_session_layer(
    redis_url: &str,
    same_site: SameSite,
) -> Result<SessionManagerLayer<RedisStore<Pool>>> {
    let config = Config::from_url(redis_url).context("failed to parse Redis URL")?;

    let pool = Builder::from_config(config)
        .build_pool(1)
        .context("failed to create Redis pool")?;

    pool.init()
        .await
        .context("failed to connect to Redis for sessions")?;

    let store = RedisStore::new(pool);

    let session_layer = SessionManagerLayer::new(store)
        .with_secure(true)
        .with_http_only(true)
        .with_same_site(same_site)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_EXPIRY_HOURS)));

    Ok(session_layer)
}

/// Record the authenticated principal in the session.
pub async fn store_principal(session: &Session, principal: &Principal) -> Result<()> {
    session
        .insert(SESSION_PRINCIPAL, principal)
        .await
        .context("failed to store principal in session")
}

/// Load the authenticated principal from the session, if any.
pub async fn load_principal(session: &Session) -> Result<Option<Principal>> {
    session
        .get::<Principal>(SESSION_PRINCIPAL)
        .await
        .context("failed to load principal from session")
}
