//! Blog access grants: the persisted (user, blog) → role relation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::role::Role;

/// An explicit grant of a role to a user on a blog.
///
/// At most one row exists per `(user_id, blog_id)` pair; regrants overwrite
/// the role in place. Rows hold `editor`, `admin`, or `owner` — never
/// `master`, which is platform-wide and not a per-blog grant.
#[derive(Debug, Clone, Serialize)]
pub struct BlogAccess {
    pub user_id: i64,
    pub blog_id: i64,
    pub role: Role,
    pub created: DateTime<Utc>,
}
