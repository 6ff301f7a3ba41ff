//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Built-in platform operator emails, always present in the allow-list.
const BUILT_IN_SUPER_ADMINS: &[&str] = &["admin@cbrazil.com"];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Redis connection URL for sessions.
    pub redis_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "strict").
    pub cookie_same_site: String,

    /// Shared secret used to verify identity-provider tokens.
    pub auth_token_secret: String,

    /// Platform operator emails: the built-in list merged with
    /// SUPER_ADMIN_EMAILS. Injected into the access service at startup.
    pub super_admin_emails: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "strict".to_string())
            .to_lowercase();

        let auth_token_secret = env::var("AUTH_TOKEN_SECRET")
            .context("AUTH_TOKEN_SECRET environment variable is required")?;

        let super_admin_emails =
            merge_super_admins(env::var("SUPER_ADMIN_EMAILS").ok().as_deref());

        Ok(Self {
            port,
            database_url,
            redis_url,
            database_max_connections,
            cors_allowed_origins,
            cookie_same_site,
            auth_token_secret,
            super_admin_emails,
        })
    }
}

/// Merge the built-in operator list with a comma-separated override.
///
/// Entries are trimmed of surrounding whitespace but otherwise kept as-is:
/// allow-list matching is case-sensitive, so the operator input is not
/// normalized.
fn merge_super_admins(extra: Option<&str>) -> Vec<String> {
    let mut emails: Vec<String> = BUILT_IN_SUPER_ADMINS
        .iter()
        .map(|s| (*s).to_string())
        .collect();

    if let Some(extra) = extra {
        for entry in extra.split(',') {
            let entry = entry.trim();
            if !entry.is_empty() && !emails.iter().any(|e| e == entry) {
                emails.push(entry.to_string());
            }
        }
    }

    emails
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_includes_built_ins() {
        let merged = merge_super_admins(None);
        assert_eq!(merged, vec!["admin@cbrazil.com".to_string()]);
    }

    #[test]
    fn test_merge_appends_and_dedups() {
        let merged = merge_super_admins(Some(" ops@x.com ,admin@cbrazil.com,, ops@x.com"));
        assert_eq!(
            merged,
            vec!["admin@cbrazil.com".to_string(), "ops@x.com".to_string()]
        );
    }

    #[test]
    fn test_merge_preserves_case() {
        let merged = merge_super_admins(Some("Ops@X.com"));
        assert!(merged.contains(&"Ops@X.com".to_string()));
    }
}
