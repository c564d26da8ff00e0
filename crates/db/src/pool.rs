//! Database connection pool

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct DbPool(SqlitePool);

impl DbPool {
    /// Connect to database and run migrations
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to database: {}", url);

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        info!("Running database migrations");
        migrate(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self(pool))
    }

    /// Create an in-memory database for testing
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        migrate(&pool).await?;
        Ok(Self(pool))
    }

    /// Get the inner pool
    pub fn inner(&self) -> &SqlitePool {
        &self.0
    }

    /// Close the pool
    pub async fn close(&self) {
        self.0.close().await;
    }
}

/// Run database migrations.
///
/// Uniqueness (user email, organization name and contact email) lives here
/// as UNIQUE constraints so concurrent creates cannot race past an
/// application-level existence check.
async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            phone TEXT,
            location TEXT NOT NULL,
            bio TEXT,
            interests TEXT NOT NULL DEFAULT '[]',
            experience TEXT,
            availability TEXT,
            skills TEXT NOT NULL DEFAULT '[]',
            join_date TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            mission TEXT,
            website TEXT,
            logo TEXT,
            location TEXT NOT NULL,
            contact_email TEXT NOT NULL UNIQUE,
            contact_phone TEXT,
            is_verified BOOLEAN NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS opportunities (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            long_description TEXT,
            category TEXT NOT NULL,
            location TEXT NOT NULL,
            duration TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            requirements TEXT NOT NULL DEFAULT '[]',
            benefits TEXT NOT NULL DEFAULT '[]',
            skills TEXT NOT NULL DEFAULT '[]',
            max_volunteers INTEGER,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            is_featured BOOLEAN NOT NULL DEFAULT 0,
            organization_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(organization_id) REFERENCES organizations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'pending',
            applied_at TEXT NOT NULL,
            user_id TEXT NOT NULL,
            opportunity_id TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(opportunity_id) REFERENCES opportunities(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS volunteer_history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            opportunity_id TEXT,
            title TEXT NOT NULL,
            organization TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            hours INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT,
            earned_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            opportunity_id TEXT,
            organization_id TEXT,
            rating INTEGER NOT NULL,
            comment TEXT,
            is_public BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
