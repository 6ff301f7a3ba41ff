//! Blog model: the tenant unit.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Blog record.
#[derive(Debug, Clone, Serialize)]
pub struct Blog {
    pub id: i64,
    pub name: String,
    pub domain: Option<String>,
    /// The designated owner. Grants owner-level access independent of any
    /// `BlogAccess` row. Nullable: a blog survives its owner's deletion.
    pub owner_id: Option<i64>,
    pub created: DateTime<Utc>,
}

/// Fields for inserting a new blog.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub name: String,
    pub domain: Option<String>,
    pub owner_id: Option<i64>,
}

impl Blog {
    /// Whether `user_id` is this blog's designated owner.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}
