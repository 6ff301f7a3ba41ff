//! Inbound identity: principals and the verifier seam.
//!
//! The kernel never parses raw credentials itself. An [`IdentityVerifier`]
//! turns an opaque credential from the identity provider into a
//! [`Principal`], and only verified principals reach the session and the
//! access-control core. Callers that cannot produce a principal must stop
//! with an unauthenticated response before any access check runs.

mod jwt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use jwt::JwtVerifier;

/// The authenticated identity attached to an inbound request.
///
/// Constructed fresh per login from verified identity-provider data and
/// carried in the server-side session; it is a view over the [`User`]
/// record, not itself persisted.
///
/// [`User`]: crate::models::User
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque, stable subject id from the identity provider.
    pub identity_id: String,
    /// Verified email. The natural key for user resolution and the
    /// super-admin discriminant.
    pub email: String,
    /// Display name, when the provider supplies one.
    pub name: Option<String>,
}

/// Verifies an identity-provider credential into a [`Principal`].
///
/// `Ok(None)` means the credential is invalid or expired (the caller
/// responds 401); `Err` means verification itself could not run.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Option<Principal>>;
}
