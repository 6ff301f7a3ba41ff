//! Blog-scoped roles and the role hierarchy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A role value that does not match any known role.
///
/// Raised at the storage/API deserialization boundary; inside the kernel
/// roles are closed enums and this error is unrepresentable.
#[derive(Debug, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

/// Effective role of a user with respect to a specific blog.
///
/// The four variants form a total order: `editor < admin < owner < master`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Editor,
    Admin,
    Owner,
    Master,
}

impl Role {
    /// Position of this role in the hierarchy (editor=1 .. master=4).
    pub fn rank(self) -> u8 {
        match self {
            Role::Editor => 1,
            Role::Admin => 2,
            Role::Owner => 3,
            Role::Master => 4,
        }
    }

    /// Whether this role is at least as powerful as `required`.
    pub fn sufficient(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// Canonical lowercase name, as stored and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Master => "master",
        }
    }

    /// Parse a stored role value.
    ///
    /// Matching is exact (case-sensitive); anything else fails closed.
    pub fn parse(value: &str) -> Result<Self, UnknownRole> {
        match value {
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            "master" => Ok(Role::Master),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles that can be handed out through the grant path.
///
/// Ownership is transferred by rewriting `Blog::owner_id`, and master is
/// platform-wide, so neither is representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantRole {
    Editor,
    Admin,
}

impl GrantRole {
    /// The blog-scoped role this grant confers.
    pub fn as_role(self) -> Role {
        match self {
            GrantRole::Editor => Role::Editor,
            GrantRole::Admin => Role::Admin,
        }
    }
}

/// Platform-wide role stored on the user record.
///
/// Independent of any per-blog role; only `Master` carries behavioral
/// weight (it bypasses per-blog checks entirely). The rest is informational
/// and managed by operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformRole {
    User,
    Editor,
    Admin,
    Owner,
    Master,
}

impl PlatformRole {
    /// Whether this user bypasses all per-blog access checks.
    pub fn is_master(self) -> bool {
        matches!(self, PlatformRole::Master)
    }

    /// Canonical lowercase name, as stored and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformRole::User => "user",
            PlatformRole::Editor => "editor",
            PlatformRole::Admin => "admin",
            PlatformRole::Owner => "owner",
            PlatformRole::Master => "master",
        }
    }

    /// Parse a stored platform role value. Fails closed on unknown input.
    pub fn parse(value: &str) -> Result<Self, UnknownRole> {
        match value {
            "user" => Ok(PlatformRole::User),
            "editor" => Ok(PlatformRole::Editor),
            "admin" => Ok(PlatformRole::Admin),
            "owner" => Ok(PlatformRole::Owner),
            "master" => Ok(PlatformRole::Master),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
