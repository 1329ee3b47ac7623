//! COT report repository.
//!
//! One fetched page of normalized reports is written in one transaction.
//! Conflicts on the natural key `(market_id, report_date, source)` update
//! the numeric columns — last fetch wins, never a duplicate row.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::{CotReportRecord, NewCotReport};

/// Repository for COT report operations.
#[derive(Debug, Clone)]
pub struct CotReportRepository {
    pool: PgPool,
}

impl CotReportRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of reports within a single transaction.
    ///
    /// Returns the number of rows written (inserted or updated). A failure
    /// rolls back the whole batch.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, reports: &[NewCotReport]) -> Result<usize> {
        if reports.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for report in reports {
            sqlx::query(
                r#"
                INSERT INTO cot_reports
                    (market_id, report_date, publish_date,
                     commercial_long, commercial_short,
                     non_commercial_long, non_commercial_short,
                     non_reportable_long, non_reportable_short,
                     open_interest,
                     commercial_long_change, commercial_short_change,
                     non_commercial_long_change, non_commercial_short_change,
                     source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                ON CONFLICT (market_id, report_date, source) DO UPDATE
                SET publish_date = EXCLUDED.publish_date,
                    commercial_long = EXCLUDED.commercial_long,
                    commercial_short = EXCLUDED.commercial_short,
                    non_commercial_long = EXCLUDED.non_commercial_long,
                    non_commercial_short = EXCLUDED.non_commercial_short,
                    non_reportable_long = EXCLUDED.non_reportable_long,
                    non_reportable_short = EXCLUDED.non_reportable_short,
                    open_interest = EXCLUDED.open_interest,
                    commercial_long_change = EXCLUDED.commercial_long_change,
                    commercial_short_change = EXCLUDED.commercial_short_change,
                    non_commercial_long_change = EXCLUDED.non_commercial_long_change,
                    non_commercial_short_change = EXCLUDED.non_commercial_short_change,
                    updated_at = now()
                "#,
            )
            .bind(report.market_id)
            .bind(report.report_date)
            .bind(report.publish_date)
            .bind(report.commercial_long)
            .bind(report.commercial_short)
            .bind(report.non_commercial_long)
            .bind(report.non_commercial_short)
            .bind(report.non_reportable_long)
            .bind(report.non_reportable_short)
            .bind(report.open_interest)
            .bind(report.commercial_long_change)
            .bind(report.commercial_short_change)
            .bind(report.non_commercial_long_change)
            .bind(report.non_commercial_short_change)
            .bind(&report.source)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(reports.len())
    }

    /// Fetches the stored report for one natural key.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_market_and_date(
        &self,
        market_id: i32,
        report_date: NaiveDate,
        source: &str,
    ) -> Result<Option<CotReportRecord>> {
        let record = sqlx::query_as::<_, CotReportRecord>(
            r#"
            SELECT id, market_id, report_date, publish_date,
                   commercial_long, commercial_short,
                   non_commercial_long, non_commercial_short,
                   non_reportable_long, non_reportable_short,
                   open_interest,
                   commercial_long_change, commercial_short_change,
                   non_commercial_long_change, non_commercial_short_change,
                   source
            FROM cot_reports
            WHERE market_id = $1 AND report_date = $2 AND source = $3
            "#,
        )
        .bind(market_id)
        .bind(report_date)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Returns the last `limit` reports for a market in chronological order
    /// (oldest first), or the full history when `limit` is None.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        market_id: i32,
        source: &str,
        limit: Option<i64>,
    ) -> Result<Vec<CotReportRecord>> {
        let records = sqlx::query_as::<_, CotReportRecord>(
            r#"
            SELECT * FROM (
                SELECT id, market_id, report_date, publish_date,
                       commercial_long, commercial_short,
                       non_commercial_long, non_commercial_short,
                       non_reportable_long, non_reportable_short,
                       open_interest,
                       commercial_long_change, commercial_short_change,
                       non_commercial_long_change, non_commercial_short_change,
                       source
                FROM cot_reports
                WHERE market_id = $1 AND source = $2
                ORDER BY report_date DESC
                LIMIT $3
            ) recent
            ORDER BY report_date ASC
            "#,
        )
        .bind(market_id)
        .bind(source)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Most recent stored report for one market.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_for_market(
        &self,
        market_id: i32,
        source: &str,
    ) -> Result<Option<CotReportRecord>> {
        let record = sqlx::query_as::<_, CotReportRecord>(
            r#"
            SELECT id, market_id, report_date, publish_date,
                   commercial_long, commercial_short,
                   non_commercial_long, non_commercial_short,
                   non_reportable_long, non_reportable_short,
                   open_interest,
                   commercial_long_change, commercial_short_change,
                   non_commercial_long_change, non_commercial_short_change,
                   source
            FROM cot_reports
            WHERE market_id = $1 AND source = $2
            ORDER BY report_date DESC
            LIMIT 1
            "#,
        )
        .bind(market_id)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Reports for a market within an inclusive date range, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history_range(
        &self,
        market_id: i32,
        source: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CotReportRecord>> {
        let records = sqlx::query_as::<_, CotReportRecord>(
            r#"
            SELECT id, market_id, report_date, publish_date,
                   commercial_long, commercial_short,
                   non_commercial_long, non_commercial_short,
                   non_reportable_long, non_reportable_short,
                   open_interest,
                   commercial_long_change, commercial_short_change,
                   non_commercial_long_change, non_commercial_short_change,
                   source
            FROM cot_reports
            WHERE market_id = $1 AND source = $2
              AND report_date BETWEEN $3 AND $4
            ORDER BY report_date ASC
            "#,
        )
        .bind(market_id)
        .bind(source)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Latest stored report date for a source — the incremental watermark.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_report_date(&self, source: &str) -> Result<Option<NaiveDate>> {
        let row: (Option<NaiveDate>,) =
            sqlx::query_as("SELECT MAX(report_date) FROM cot_reports WHERE source = $1")
                .bind(source)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }

    /// Total stored reports for a source.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, source: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cot_reports WHERE source = $1")
            .bind(source)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Earliest and latest stored report dates for a source.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn date_range(&self, source: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let row: (Option<NaiveDate>, Option<NaiveDate>) = sqlx::query_as(
            "SELECT MIN(report_date), MAX(report_date) FROM cot_reports WHERE source = $1",
        )
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        match row {
            (Some(earliest), Some(latest)) => Ok(Some((earliest, latest))),
            _ => Ok(None),
        }
    }
}
