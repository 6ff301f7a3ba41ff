//! Persistence boundary for the access-control core.
//!
//! All reads and writes of users, blogs, and access grants go through
//! [`AccessStore`]. The trait assumes the backing store enforces the two
//! uniqueness constraints the core's correctness rests on:
//!
//! - `users.email` is unique (find-or-create backstop),
//! - `(user_id, blog_id)` identifies at most one access row.
//!
//! Two implementations ship: [`PgAccessStore`] for production and
//! [`MemoryAccessStore`] for tests and local development.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryAccessStore;
pub use postgres::PgAccessStore;

use crate::models::{Blog, BlogAccess, NewBlog, NewUser, Role, User};

/// Storage operations used by the access-control core.
#[async_trait]
pub trait AccessStore: Send + Sync {
    // --- Users ---

    /// Find a user by exact email match.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by id.
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Insert a user if no row with the same email exists, returning the
    /// inserted or pre-existing row.
    ///
    /// Must be atomic with respect to concurrent inserts of the same email:
    /// never a plain check-then-insert.
    async fn insert_user(&self, new: &NewUser) -> Result<User>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user. Their access rows go with them; blogs they owned
    /// remain, with `owner_id` cleared. Returns false if the user did not
    /// exist.
    async fn delete_user(&self, id: i64) -> Result<bool>;

    // --- Blogs ---

    /// Insert a new blog.
    async fn insert_blog(&self, new: &NewBlog) -> Result<Blog>;

    /// Find a blog by id.
    async fn find_blog(&self, id: i64) -> Result<Option<Blog>>;

    /// List all blogs.
    async fn list_blogs(&self) -> Result<Vec<Blog>>;

    /// List blogs the user owns or holds an access row on.
    async fn list_blogs_for_user(&self, user_id: i64) -> Result<Vec<Blog>>;

    /// Reassign a blog's designated owner. Returns false if the blog did
    /// not exist.
    async fn set_blog_owner(&self, blog_id: i64, owner_id: i64) -> Result<bool>;

    /// Delete a blog and, with it, every access row on it. Returns false if
    /// the blog did not exist.
    async fn delete_blog(&self, id: i64) -> Result<bool>;

    // --- Access rows ---

    /// Load the access row for `(user_id, blog_id)`, if any.
    async fn find_access(&self, user_id: i64, blog_id: i64) -> Result<Option<BlogAccess>>;

    /// Insert or overwrite the access row for `(user_id, blog_id)`.
    async fn upsert_access(&self, user_id: i64, blog_id: i64, role: Role) -> Result<BlogAccess>;

    /// Delete the access row for `(user_id, blog_id)`. Absence is not an
    /// error; returns whether a row existed.
    async fn delete_access(&self, user_id: i64, blog_id: i64) -> Result<bool>;

    /// List all access rows on a blog.
    async fn list_access_for_blog(&self, blog_id: i64) -> Result<Vec<BlogAccess>>;

    /// Whether the backing store is reachable.
    async fn check_health(&self) -> bool;
}
