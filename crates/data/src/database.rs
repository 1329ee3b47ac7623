use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Bundled DDL, applied on bootstrap. All statements are idempotent.
const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Explicitly constructed database handle, passed down to repositories.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects to the specified `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the bundled schema. Safe to call on every startup.
    ///
    /// # Errors
    /// Returns an error if any DDL statement fails.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::info!("database schema initialized");
        Ok(())
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes the pool, waiting for in-flight connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
