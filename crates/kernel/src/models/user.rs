//! User model: internal account records resolved from external identities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::role::PlatformRole;

/// Internal user record.
///
/// Created on first sight of a previously-unseen email (find-or-create);
/// never mutated by repeat logins.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    /// Unique; the natural key used by find-or-create.
    pub email: String,
    pub name: String,
    /// Platform-wide role. Distinct from any per-blog role.
    pub role: PlatformRole,
    pub created: DateTime<Utc>,
}

/// Fields for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: PlatformRole,
}

impl NewUser {
    /// Build the record inserted on a principal's first login.
    ///
    /// Falls back to the email's local part when the identity provider
    /// supplied no display name. New users start at the lowest tier.
    pub fn from_identity(email: &str, name: Option<&str>) -> Self {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => local_part(email).to_string(),
        };

        Self {
            email: email.to_string(),
            name,
            role: PlatformRole::User,
        }
    }
}

/// The local part of an email address (everything before the `@`).
pub fn local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_part() {
        assert_eq!(local_part("ed@example.com"), "ed");
        assert_eq!(local_part("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_new_user_name_fallback() {
        let user = NewUser::from_identity("ada@example.com", None);
        assert_eq!(user.name, "ada");
        assert_eq!(user.role, PlatformRole::User);

        let user = NewUser::from_identity("ada@example.com", Some("  "));
        assert_eq!(user.name, "ada");

        let user = NewUser::from_identity("ada@example.com", Some("Ada L."));
        assert_eq!(user.name, "Ada L.");
    }
}
