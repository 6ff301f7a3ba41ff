//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::access::AccessService;
use crate::auth::{IdentityVerifier, JwtVerifier};
use crate::config::Config;
use crate::db;
use crate::store::{AccessStore, PgAccessStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Persistence boundary. All storage access goes through this.
    store: Arc<dyn AccessStore>,

    /// Access-control service (decisions, grants, relation cache).
    access: AccessService,

    /// Identity-provider credential verifier.
    verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Create production state: PostgreSQL store, JWT verifier.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        let store: Arc<dyn AccessStore> = Arc::new(PgAccessStore::new(pool));
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(JwtVerifier::new(&config.auth_token_secret));

        Ok(Self::from_parts(
            store,
            verifier,
            config.super_admin_emails.clone(),
        ))
    }

    /// Assemble state from explicit components.
    ///
    /// This is the seam tests use to run the real routers over the
    /// in-memory store.
    pub fn from_parts(
        store: Arc<dyn AccessStore>,
        verifier: Arc<dyn IdentityVerifier>,
        super_admin_emails: Vec<String>,
    ) -> Self {
        let access = AccessService::new(store.clone(), super_admin_emails);

        Self {
            inner: Arc::new(AppStateInner {
                store,
                access,
                verifier,
            }),
        }
    }

    /// The persistence boundary.
    pub fn store(&self) -> &Arc<dyn AccessStore> {
        &self.inner.store
    }

    /// The access-control service.
    pub fn access(&self) -> &AccessService {
        &self.inner.access
    }

    /// The identity verifier.
    pub fn verifier(&self) -> &dyn IdentityVerifier {
        self.inner.verifier.as_ref()
    }
}
