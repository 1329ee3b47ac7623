//! Storage seam for the pipeline.
//!
//! The pipeline consumes reports storage through this trait rather than a
//! concrete repository, so tests can substitute an in-memory double. The
//! production implementation delegates to the sqlx repository.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use cot_data::{CotReportRecord, CotReportRepository, NewCotReport};

/// Report storage as seen by the ingestion pipeline.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Writes one batch transactionally; conflicts on the natural key
    /// update in place. Returns rows written.
    async fn upsert_batch(&self, reports: &[NewCotReport]) -> Result<usize>;

    /// Fetches the stored report for one natural key.
    async fn find_by_market_and_date(
        &self,
        market_id: i32,
        report_date: NaiveDate,
        source: &str,
    ) -> Result<Option<CotReportRecord>>;

    /// Latest stored report date for a source (the incremental watermark).
    async fn latest_report_date(&self, source: &str) -> Result<Option<NaiveDate>>;

    /// Total stored reports for a source.
    async fn count(&self, source: &str) -> Result<i64>;

    /// Earliest and latest stored report dates for a source.
    async fn date_range(&self, source: &str) -> Result<Option<(NaiveDate, NaiveDate)>>;
}

#[async_trait]
impl ReportStore for CotReportRepository {
    async fn upsert_batch(&self, reports: &[NewCotReport]) -> Result<usize> {
        CotReportRepository::upsert_batch(self, reports).await
    }

    async fn find_by_market_and_date(
        &self,
        market_id: i32,
        report_date: NaiveDate,
        source: &str,
    ) -> Result<Option<CotReportRecord>> {
        CotReportRepository::find_by_market_and_date(self, market_id, report_date, source).await
    }

    async fn latest_report_date(&self, source: &str) -> Result<Option<NaiveDate>> {
        CotReportRepository::latest_report_date(self, source).await
    }

    async fn count(&self, source: &str) -> Result<i64> {
        CotReportRepository::count(self, source).await
    }

    async fn date_range(&self, source: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        CotReportRepository::date_range(self, source).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store double shared by pipeline tests.

    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};
    use std::sync::Mutex;

    type Key = (i32, NaiveDate, String);

    /// In-memory `ReportStore` with natural-key upsert semantics and
    /// insert/update counters. Can be primed to fail a number of batch
    /// writes to exercise the retry path.
    #[derive(Default)]
    pub struct MemoryStore {
        rows: Mutex<BTreeMap<Key, CotReportRecord>>,
        next_id: AtomicI64,
        inserts: AtomicU64,
        updates: AtomicU64,
        failures_remaining: AtomicU32,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fails the next `n` upsert_batch calls before succeeding.
        pub fn with_failures(n: u32) -> Self {
            let store = Self::default();
            store.failures_remaining.store(n, Ordering::SeqCst);
            store
        }

        /// Seeds one stored report directly, bypassing the counters.
        pub fn seed(&self, record: CotReportRecord) {
            let key = (record.market_id, record.report_date, record.source.clone());
            self.rows.lock().expect("store lock").insert(key, record);
        }

        pub fn len(&self) -> usize {
            self.rows.lock().expect("store lock").len()
        }

        pub fn inserts(&self) -> u64 {
            self.inserts.load(Ordering::SeqCst)
        }

        pub fn updates(&self) -> u64 {
            self.updates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReportStore for MemoryStore {
        async fn upsert_batch(&self, reports: &[NewCotReport]) -> Result<usize> {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                anyhow::bail!("storage offline");
            }

            let mut rows = self.rows.lock().expect("store lock");
            for report in reports {
                let key = (report.market_id, report.report_date, report.source.clone());
                if let Some(existing) = rows.get(&key) {
                    let id = existing.id;
                    rows.insert(key, report.clone().into_record(id));
                    self.updates.fetch_add(1, Ordering::SeqCst);
                } else {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                    rows.insert(key, report.clone().into_record(id));
                    self.inserts.fetch_add(1, Ordering::SeqCst);
                }
            }
            Ok(reports.len())
        }

        async fn find_by_market_and_date(
            &self,
            market_id: i32,
            report_date: NaiveDate,
            source: &str,
        ) -> Result<Option<CotReportRecord>> {
            let key = (market_id, report_date, source.to_string());
            Ok(self.rows.lock().expect("store lock").get(&key).cloned())
        }

        async fn latest_report_date(&self, source: &str) -> Result<Option<NaiveDate>> {
            Ok(self
                .rows
                .lock()
                .expect("store lock")
                .values()
                .filter(|r| r.source == source)
                .map(|r| r.report_date)
                .max())
        }

        async fn count(&self, source: &str) -> Result<i64> {
            Ok(self
                .rows
                .lock()
                .expect("store lock")
                .values()
                .filter(|r| r.source == source)
                .count() as i64)
        }

        async fn date_range(&self, source: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
            let rows = self.rows.lock().expect("store lock");
            let dates: Vec<NaiveDate> = rows
                .values()
                .filter(|r| r.source == source)
                .map(|r| r.report_date)
                .collect();
            match (dates.iter().min(), dates.iter().max()) {
                (Some(&earliest), Some(&latest)) => Ok(Some((earliest, latest))),
                _ => Ok(None),
            }
        }
    }
}
