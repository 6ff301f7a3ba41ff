//! In-memory [`AccessStore`] for tests and local development.
//!
//! Mirrors the constraint semantics the PostgreSQL schema enforces: unique
//! emails, one access row per `(user_id, blog_id)`, and cascade behavior on
//! user/blog deletion.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{Blog, BlogAccess, NewBlog, NewUser, Role, User};

use super::AccessStore;

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    blogs: BTreeMap<i64, Blog>,
    access: BTreeMap<(i64, i64), BlogAccess>,
    next_user_id: i64,
    next_blog_id: i64,
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryAccessStore {
    inner: RwLock<Inner>,
}

impl MemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn insert_user(&self, new: &NewUser) -> Result<User> {
        // Single critical section: insert-if-absent-else-return-existing.
        let mut inner = self.inner.write();

        if let Some(existing) = inner.users.values().find(|u| u.email == new.email) {
            return Ok(existing.clone());
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: new.email.clone(),
            name: new.name.clone(),
            role: new.role,
            created: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().users.values().cloned().collect())
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write();

        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }

        inner.access.retain(|(user_id, _), _| *user_id != id);
        for blog in inner.blogs.values_mut() {
            if blog.owner_id == Some(id) {
                blog.owner_id = None;
            }
        }

        Ok(true)
    }

    async fn insert_blog(&self, new: &NewBlog) -> Result<Blog> {
        let mut inner = self.inner.write();

        inner.next_blog_id += 1;
        let blog = Blog {
            id: inner.next_blog_id,
            name: new.name.clone(),
            domain: new.domain.clone(),
            owner_id: new.owner_id,
            created: Utc::now(),
        };
        inner.blogs.insert(blog.id, blog.clone());

        Ok(blog)
    }

    async fn find_blog(&self, id: i64) -> Result<Option<Blog>> {
        Ok(self.inner.read().blogs.get(&id).cloned())
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>> {
        Ok(self.inner.read().blogs.values().cloned().collect())
    }

    async fn list_blogs_for_user(&self, user_id: i64) -> Result<Vec<Blog>> {
        let inner = self.inner.read();
        Ok(inner
            .blogs
            .values()
            .filter(|b| b.owner_id == Some(user_id) || inner.access.contains_key(&(user_id, b.id)))
            .cloned()
            .collect())
    }

    async fn set_blog_owner(&self, blog_id: i64, owner_id: i64) -> Result<bool> {
        let mut inner = self.inner.write();

        let Some(blog) = inner.blogs.get_mut(&blog_id) else {
            return Ok(false);
        };
        blog.owner_id = Some(owner_id);

        Ok(true)
    }

    async fn delete_blog(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write();

        if inner.blogs.remove(&id).is_none() {
            return Ok(false);
        }
        inner.access.retain(|(_, blog_id), _| *blog_id != id);

        Ok(true)
    }

    async fn find_access(&self, user_id: i64, blog_id: i64) -> Result<Option<BlogAccess>> {
        Ok(self.inner.read().access.get(&(user_id, blog_id)).cloned())
    }

    async fn upsert_access(&self, user_id: i64, blog_id: i64, role: Role) -> Result<BlogAccess> {
        let mut inner = self.inner.write();

        let row = inner
            .access
            .entry((user_id, blog_id))
            .and_modify(|row| row.role = role)
            .or_insert_with(|| BlogAccess {
                user_id,
                blog_id,
                role,
                created: Utc::now(),
            });

        Ok(row.clone())
    }

    async fn delete_access(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        Ok(self.inner.write().access.remove(&(user_id, blog_id)).is_some())
    }

    async fn list_access_for_blog(&self, blog_id: i64) -> Result<Vec<BlogAccess>> {
        let inner = self.inner.read();
        Ok(inner
            .access
            .values()
            .filter(|row| row.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn check_health(&self) -> bool {
        true
    }
}
