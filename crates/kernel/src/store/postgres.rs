//! PostgreSQL-backed [`AccessStore`].
//!
//! Row structs decode the raw column values; role columns are TEXT and are
//! validated into closed enums here, at the deserialization boundary. A row
//! holding an unrecognized role is a fault, not a denial.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{Blog, BlogAccess, NewBlog, NewUser, PlatformRole, Role, User};

use super::AccessStore;

/// Production store over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgAccessStore {
    pool: PgPool,
}

impl PgAccessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    role: String,
    created: DateTime<Utc>,
}

impl UserRow {
    fn into_model(self) -> Result<User> {
        let role = PlatformRole::parse(&self.role)
            .with_context(|| format!("user {} has an invalid role", self.id))?;

        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            created: self.created,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: i64,
    name: String,
    domain: Option<String>,
    owner_id: Option<i64>,
    created: DateTime<Utc>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Blog {
            id: row.id,
            name: row.name,
            domain: row.domain,
            owner_id: row.owner_id,
            created: row.created,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccessRow {
    user_id: i64,
    blog_id: i64,
    role: String,
    created: DateTime<Utc>,
}

impl AccessRow {
    fn into_model(self) -> Result<BlogAccess> {
        let role = Role::parse(&self.role).with_context(|| {
            format!(
                "access row ({}, {}) has an invalid role",
                self.user_id, self.blog_id
            )
        })?;

        // Master is platform-wide; a stored per-blog master grant is corrupt.
        if role == Role::Master {
            anyhow::bail!(
                "access row ({}, {}) holds a master grant",
                self.user_id,
                self.blog_id
            );
        }

        Ok(BlogAccess {
            user_id: self.user_id,
            blog_id: self.blog_id,
            role,
            created: self.created,
        })
    }
}

#[async_trait]
impl AccessStore for PgAccessStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch user by email")?;

        row.map(UserRow::into_model).transpose()
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch user by id")?;

        row.map(UserRow::into_model).transpose()
    }

    async fn insert_user(&self, new: &NewUser) -> Result<User> {
        // ON CONFLICT DO NOTHING + re-select keeps concurrent first logins
        // from racing to duplicate rows; the unique index is the backstop.
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&new.email)
        .bind(&new.name)
        .bind(new.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("failed to insert user")?;

        if let Some(row) = inserted {
            return row.into_model();
        }

        // Lost the race: the row now exists, return it.
        self.find_user_by_email(&new.email)
            .await?
            .with_context(|| format!("user {:?} vanished after insert conflict", new.email))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("failed to list users")?;

        rows.into_iter().map(UserRow::into_model).collect()
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        // blog_access rows cascade; owned blogs keep running with a cleared
        // owner_id (both enforced by the schema).
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_blog(&self, new: &NewBlog) -> Result<Blog> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            INSERT INTO blogs (name, domain, owner_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.domain)
        .bind(new.owner_id)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert blog")?;

        Ok(row.into())
    }

    async fn find_blog(&self, id: i64) -> Result<Option<Blog>> {
        let row = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch blog by id")?;

        Ok(row.map(Blog::from))
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let rows = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("failed to list blogs")?;

        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn list_blogs_for_user(&self, user_id: i64) -> Result<Vec<Blog>> {
        let rows = sqlx::query_as::<_, BlogRow>(
            r#"
            SELECT * FROM blogs WHERE owner_id = $1
            UNION
            SELECT b.* FROM blogs b
            JOIN blog_access a ON a.blog_id = b.id
            WHERE a.user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list blogs for user")?;

        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn set_blog_owner(&self, blog_id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE blogs SET owner_id = $1 WHERE id = $2")
            .bind(owner_id)
            .bind(blog_id)
            .execute(&self.pool)
            .await
            .context("failed to set blog owner")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_blog(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete blog")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_access(&self, user_id: i64, blog_id: i64) -> Result<Option<BlogAccess>> {
        let row = sqlx::query_as::<_, AccessRow>(
            "SELECT * FROM blog_access WHERE user_id = $1 AND blog_id = $2",
        )
        .bind(user_id)
        .bind(blog_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch access row")?;

        row.map(AccessRow::into_model).transpose()
    }

    async fn upsert_access(&self, user_id: i64, blog_id: i64, role: Role) -> Result<BlogAccess> {
        let row = sqlx::query_as::<_, AccessRow>(
            r#"
            INSERT INTO blog_access (user_id, blog_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, blog_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(blog_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .context("failed to upsert access row")?;

        row.into_model()
    }

    async fn delete_access(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blog_access WHERE user_id = $1 AND blog_id = $2")
            .bind(user_id)
            .bind(blog_id)
            .execute(&self.pool)
            .await
            .context("failed to delete access row")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_access_for_blog(&self, blog_id: i64) -> Result<Vec<BlogAccess>> {
        let rows = sqlx::query_as::<_, AccessRow>(
            "SELECT * FROM blog_access WHERE blog_id = $1 ORDER BY user_id",
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list access rows")?;

        rows.into_iter().map(AccessRow::into_model).collect()
    }

    async fn check_health(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
