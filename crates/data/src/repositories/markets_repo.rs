//! Market catalog repository.
//!
//! Seeds the `markets` table from the static catalog and serves lookups.
//! Catalog rows are insert-if-absent; existing rows keep any manual edits.

use anyhow::Result;
use cot_core::catalog::MarketSpec;
use sqlx::PgPool;

use crate::models::MarketRecord;

/// Repository for catalog market operations.
#[derive(Debug, Clone)]
pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seeds the catalog. Returns the number of newly inserted markets.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn seed(&self, specs: &[MarketSpec]) -> Result<u64> {
        let mut inserted = 0;

        for spec in specs {
            let result = sqlx::query(
                r#"
                INSERT INTO markets (symbol, name, category, exchange, cftc_code, active)
                VALUES ($1, $2, $3, $4, $5, TRUE)
                ON CONFLICT (symbol) DO NOTHING
                "#,
            )
            .bind(spec.symbol)
            .bind(spec.name)
            .bind(spec.category)
            .bind(spec.exchange)
            .bind(spec.cftc_code)
            .execute(&self.pool)
            .await?;

            inserted += result.rows_affected();
        }

        tracing::info!(total = specs.len(), inserted, "market catalog seeded");
        Ok(inserted)
    }

    /// Returns all active markets ordered by id ascending.
    ///
    /// The ordering is load-bearing: the resolver's name-fragment fallback
    /// is first-match-wins over this iteration order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_all_active(&self) -> Result<Vec<MarketRecord>> {
        let records = sqlx::query_as::<_, MarketRecord>(
            r#"
            SELECT id, symbol, name, category, exchange, cftc_code, active
            FROM markets
            WHERE active = TRUE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Looks up a market by symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_symbol(&self, symbol: &str) -> Result<Option<MarketRecord>> {
        let record = sqlx::query_as::<_, MarketRecord>(
            r#"
            SELECT id, symbol, name, category, exchange, cftc_code, active
            FROM markets
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
