//! Trend repository.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::TrendRecord;

/// Repository for per-market trend snapshots.
#[derive(Debug, Clone)]
pub struct TrendRepository {
    pool: PgPool,
}

impl TrendRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of trend snapshots within a single transaction,
    /// keyed on `(market_id, period_weeks)`.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, trends: &[TrendRecord]) -> Result<()> {
        if trends.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for trend in trends {
            sqlx::query(
                r#"
                INSERT INTO cot_trends
                    (market_id, period_weeks, week_ending, ma_commercial_net,
                     rate_of_change, is_extreme_long, is_extreme_short)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (market_id, period_weeks) DO UPDATE
                SET week_ending = EXCLUDED.week_ending,
                    ma_commercial_net = EXCLUDED.ma_commercial_net,
                    rate_of_change = EXCLUDED.rate_of_change,
                    is_extreme_long = EXCLUDED.is_extreme_long,
                    is_extreme_short = EXCLUDED.is_extreme_short
                "#,
            )
            .bind(trend.market_id)
            .bind(trend.period_weeks)
            .bind(trend.week_ending)
            .bind(trend.ma_commercial_net)
            .bind(trend.rate_of_change)
            .bind(trend.is_extreme_long)
            .bind(trend.is_extreme_short)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Returns all trend snapshots for a market, shortest period first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_market(&self, market_id: i32) -> Result<Vec<TrendRecord>> {
        let records = sqlx::query_as::<_, TrendRecord>(
            r#"
            SELECT market_id, period_weeks, week_ending, ma_commercial_net,
                   rate_of_change, is_extreme_long, is_extreme_short
            FROM cot_trends
            WHERE market_id = $1
            ORDER BY period_weeks ASC
            "#,
        )
        .bind(market_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
