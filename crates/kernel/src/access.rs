//! Blog-scoped access control.
//!
//! [`AccessService`] is the single choke-point every protected operation
//! calls before touching blog-scoped data. It resolves principals to users
//! (find-or-create), computes the effective role from ownership and access
//! grants, and caches resolved relations per `(user, blog)` pair.
//!
//! Expected denials travel as [`AccessDecision`] values; storage faults and
//! corrupt role values travel as `Err` so an outage can never read as a
//! permission error.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use serde::Serialize;

use crate::auth::Principal;
use crate::models::{BlogAccess, GrantRole, NewUser, Role, User};
use crate::store::AccessStore;

/// Why a decision was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The referenced blog does not exist.
    NotFound,
    /// The user holds no relation (ownership or grant) to the blog.
    Forbidden,
    /// The user holds a relation, but below the required role.
    InsufficientRole,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    pub granted: bool,
    /// The user's effective role on the blog, when one was resolved.
    pub effective_role: Option<Role>,
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    fn granted(effective_role: Role) -> Self {
        Self {
            granted: true,
            effective_role: Some(effective_role),
            reason: None,
        }
    }

    fn denied(reason: DenyReason) -> Self {
        Self {
            granted: false,
            effective_role: None,
            reason: Some(reason),
        }
    }

    fn insufficient(effective_role: Role) -> Self {
        Self {
            granted: false,
            effective_role: Some(effective_role),
            reason: Some(DenyReason::InsufficientRole),
        }
    }
}

/// A user's resolved relation to a blog.
enum Relation {
    /// The blog does not exist.
    Missing,
    /// The blog exists but the user holds no relation to it.
    None,
    /// The user's effective role on the blog.
    Held(Role),
}

/// Access-control service with cached relation lookups.
#[derive(Clone)]
pub struct AccessService {
    inner: Arc<AccessServiceInner>,
}

struct AccessServiceInner {
    store: Arc<dyn AccessStore>,

    /// Allow-listed operator emails, fixed at startup. Checked before any
    /// storage access so operators keep access even when the user table is
    /// corrupt or unprovisioned.
    super_admins: HashSet<String>,

    /// Cache of (user_id, blog_id) -> effective role. Positive relations
    /// only; denials are recomputed.
    relation_cache: DashMap<(i64, i64), Role>,
}

impl AccessService {
    pub fn new(store: Arc<dyn AccessStore>, super_admins: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner: Arc::new(AccessServiceInner {
                store,
                super_admins: super_admins.into_iter().collect(),
                relation_cache: DashMap::new(),
            }),
        }
    }

    /// Whether `email` is an allow-listed platform operator.
    ///
    /// Matching is case-sensitive against the configured list.
    pub fn is_super_admin(&self, email: &str) -> bool {
        self.inner.super_admins.contains(email)
    }

    /// Map a principal to its internal user record, creating one on first
    /// sight.
    ///
    /// Repeat logins return the stored row unchanged; neither `name` nor
    /// `role` is refreshed, so manually assigned roles survive.
    pub async fn resolve_user(&self, principal: &Principal) -> Result<User> {
        if let Some(user) = self.inner.store.find_user_by_email(&principal.email).await? {
            return Ok(user);
        }

        let new = NewUser::from_identity(&principal.email, principal.name.as_deref());
        self.inner.store.insert_user(&new).await
    }

    /// Decide whether `principal` may act on `blog_id` at `required`.
    ///
    /// Allow-listed emails are granted `master` before any storage lookup —
    /// including the blog lookup, so the grant holds even for blog ids that
    /// do not exist. Resolution order for everyone else: stored master,
    /// ownership, access row.
    pub async fn check_access(
        &self,
        principal: &Principal,
        blog_id: i64,
        required: Role,
    ) -> Result<AccessDecision> {
        if self.is_super_admin(&principal.email) {
            return Ok(AccessDecision::granted(Role::Master));
        }

        let user = self.resolve_user(principal).await?;
        self.check_user_access(&user, blog_id, required).await
    }

    /// [`check_access`](Self::check_access) for an already-resolved user.
    pub async fn check_user_access(
        &self,
        user: &User,
        blog_id: i64,
        required: Role,
    ) -> Result<AccessDecision> {
        // Both master sources bypass ownership and grant checks entirely.
        if self.is_super_admin(&user.email) || user.role.is_master() {
            return Ok(AccessDecision::granted(Role::Master));
        }

        match self.blog_relation(user.id, blog_id).await? {
            Relation::Missing => Ok(AccessDecision::denied(DenyReason::NotFound)),
            Relation::None => Ok(AccessDecision::denied(DenyReason::Forbidden)),
            Relation::Held(effective) if effective.sufficient(required) => {
                Ok(AccessDecision::granted(effective))
            }
            Relation::Held(effective) => Ok(AccessDecision::insufficient(effective)),
        }
    }

    /// Grant `role` on a blog, overwriting any existing grant for the pair.
    ///
    /// Ownership and master are not grantable here; [`GrantRole`] makes
    /// that unrepresentable.
    pub async fn grant(&self, user_id: i64, blog_id: i64, role: GrantRole) -> Result<BlogAccess> {
        let row = self
            .inner
            .store
            .upsert_access(user_id, blog_id, role.as_role())
            .await?;
        self.inner.relation_cache.remove(&(user_id, blog_id));

        Ok(row)
    }

    /// Revoke any grant for `(user_id, blog_id)`. Idempotent; returns
    /// whether a grant existed.
    pub async fn revoke(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        let existed = self.inner.store.delete_access(user_id, blog_id).await?;
        self.inner.relation_cache.remove(&(user_id, blog_id));

        Ok(existed)
    }

    /// Reassign a blog's designated owner.
    ///
    /// The previous owner keeps only whatever explicit grant they hold.
    /// Returns false if the blog does not exist.
    pub async fn transfer_ownership(&self, blog_id: i64, new_owner_id: i64) -> Result<bool> {
        let changed = self.inner.store.set_blog_owner(blog_id, new_owner_id).await?;
        if changed {
            self.invalidate_blog(blog_id);
        }

        Ok(changed)
    }

    /// Delete a blog and its grants.
    pub async fn delete_blog(&self, blog_id: i64) -> Result<bool> {
        let existed = self.inner.store.delete_blog(blog_id).await?;
        if existed {
            self.invalidate_blog(blog_id);
        }

        Ok(existed)
    }

    /// Delete a user and their grants. Blogs they owned remain, ownerless.
    pub async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let existed = self.inner.store.delete_user(user_id).await?;
        if existed {
            self.inner
                .relation_cache
                .retain(|(cached_user, _), _| *cached_user != user_id);
        }

        Ok(existed)
    }

    /// Number of cached relations (for monitoring).
    pub fn cache_size(&self) -> usize {
        self.inner.relation_cache.len()
    }

    /// Resolve the user's relation to a blog, consulting the cache first.
    ///
    /// Ownership dominates: the designated owner is `owner` regardless of
    /// any access row they also hold.
    async fn blog_relation(&self, user_id: i64, blog_id: i64) -> Result<Relation> {
        if let Some(cached) = self.inner.relation_cache.get(&(user_id, blog_id)) {
            return Ok(Relation::Held(*cached));
        }

        let Some(blog) = self.inner.store.find_blog(blog_id).await? else {
            return Ok(Relation::Missing);
        };

        let role = if blog.is_owned_by(user_id) {
            Some(Role::Owner)
        } else {
            self.inner
                .store
                .find_access(user_id, blog_id)
                .await?
                .map(|row| row.role)
        };

        match role {
            Some(role) => {
                self.inner.relation_cache.insert((user_id, blog_id), role);
                Ok(Relation::Held(role))
            }
            None => Ok(Relation::None),
        }
    }

    fn invalidate_blog(&self, blog_id: i64) {
        self.inner
            .relation_cache
            .retain(|(_, cached_blog), _| *cached_blog != blog_id);
    }
}
