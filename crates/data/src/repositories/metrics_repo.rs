//! Derived metrics repository.
//!
//! Metrics are derived rows keyed by report id; a recompute simply
//! replaces the previous values.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::CotMetricsRecord;

/// Repository for derived metrics.
#[derive(Debug, Clone)]
pub struct CotMetricsRepository {
    pool: PgPool,
}

impl CotMetricsRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts derived metrics for one report.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, metrics: &CotMetricsRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cot_metrics
                (cot_report_id, commercial_net, non_commercial_net,
                 commercial_long_pct, commercial_short_pct,
                 non_commercial_long_pct, non_commercial_short_pct,
                 non_reportable_pct, commercial_sentiment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (cot_report_id) DO UPDATE
            SET commercial_net = EXCLUDED.commercial_net,
                non_commercial_net = EXCLUDED.non_commercial_net,
                commercial_long_pct = EXCLUDED.commercial_long_pct,
                commercial_short_pct = EXCLUDED.commercial_short_pct,
                non_commercial_long_pct = EXCLUDED.non_commercial_long_pct,
                non_commercial_short_pct = EXCLUDED.non_commercial_short_pct,
                non_reportable_pct = EXCLUDED.non_reportable_pct,
                commercial_sentiment = EXCLUDED.commercial_sentiment
            "#,
        )
        .bind(metrics.cot_report_id)
        .bind(metrics.commercial_net)
        .bind(metrics.non_commercial_net)
        .bind(metrics.commercial_long_pct)
        .bind(metrics.commercial_short_pct)
        .bind(metrics.non_commercial_long_pct)
        .bind(metrics.non_commercial_short_pct)
        .bind(metrics.non_reportable_pct)
        .bind(metrics.commercial_sentiment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
