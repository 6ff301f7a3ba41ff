//! Database connection pool management and schema migration.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Idempotent schema DDL, applied at startup.
///
/// `blog_access` rows cascade with their user and blog; a deleted owner
/// leaves the blog in place with `owner_id` cleared.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blogs (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        name TEXT NOT NULL,
        domain TEXT,
        owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blog_access (
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        blog_id BIGINT NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
        role TEXT NOT NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (user_id, blog_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS blog_access_blog_idx ON blog_access (blog_id)",
];

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Apply the embedded schema.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to apply schema statement")?;
    }

    Ok(())
}
