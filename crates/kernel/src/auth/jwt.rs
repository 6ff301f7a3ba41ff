//! JWT-based identity verification.
//!
//! The identity provider signs a short-lived HS256 token over the claims
//! below with a secret shared through `AUTH_TOKEN_SECRET`. Full OIDC flows
//! stay on the provider's side of the boundary.

use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;

use super::{IdentityVerifier, Principal};

/// Claims expected in an identity token.
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    /// Stable subject id.
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    /// Expiry (seconds since epoch); required and validated.
    #[allow(dead_code)]
    exp: u64,
}

/// Verifier for HS256 identity tokens.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<Option<Principal>> {
        let data = match decode::<IdentityClaims>(credential, &self.key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "rejected identity token");
                return Ok(None);
            }
        };

        let claims = data.claims;
        if claims.sub.is_empty() || claims.email.is_empty() {
            debug!("rejected identity token with empty sub or email");
            return Ok(None);
        }

        Ok(Some(Principal {
            identity_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }))
    }
}
