//! The ingestion service.
//!
//! Ties the client, resolver, transformer, and writer into one sequential
//! fetch loop, and exposes the long-running variants as background jobs
//! through the single-slot runner.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use cot_core::config::IngestConfig;
use cot_source::SourceClient;

use crate::error::Result;
use crate::job::{CancelFlag, JobHandle, JobRunner, JobState};
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::resolver::Registry;
use crate::store::ReportStore;
use crate::transformer;
use crate::upserter::Upserter;

/// Tally of one fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Pages requested from the source.
    pub pages: u32,
    /// Raw records received.
    pub fetched: u64,
    /// Records resolved to a catalog market and normalized.
    pub matched: u64,
    /// Records dropped: unknown market or unparseable date.
    pub skipped: u64,
    /// Rows written (inserts plus in-place updates).
    pub persisted: u64,
}

/// Snapshot of stored coverage versus the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStatus {
    pub total_reports: i64,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    /// Most recent report date the source advertises.
    pub source_latest: Option<NaiveDate>,
    /// True when the latest stored date is at or past the source's.
    pub is_up_to_date: bool,
}

/// Orchestrates fetching, normalization, persistence, and reconciliation.
pub struct CotService<S: ReportStore> {
    registry: Arc<Registry>,
    client: Arc<SourceClient>,
    store: Arc<S>,
    config: IngestConfig,
    jobs: JobRunner,
    persist_retry_delay: Duration,
}

// S itself need not be Clone; every field is shared.
impl<S: ReportStore> Clone for CotService<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            client: Arc::clone(&self.client),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            jobs: self.jobs.clone(),
            persist_retry_delay: self.persist_retry_delay,
        }
    }
}

impl<S: ReportStore + 'static> CotService<S> {
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        client: Arc<SourceClient>,
        store: Arc<S>,
        config: IngestConfig,
    ) -> Self {
        Self {
            registry,
            client,
            store,
            config,
            jobs: JobRunner::new(),
            persist_retry_delay: Duration::from_millis(500),
        }
    }

    /// Overrides the delay between persist attempts. Tests shorten it.
    #[must_use]
    pub fn with_persist_retry_delay(mut self, delay: Duration) -> Self {
        self.persist_retry_delay = delay;
        self
    }

    /// Fetches everything newer than the incremental watermark.
    ///
    /// The watermark is the latest stored date minus a safety margin, so
    /// late source revisions inside the margin are re-fetched and updated
    /// in place. An empty store falls back to the epoch floor.
    ///
    /// # Errors
    /// Fails on exhausted fetch retries or an unpersistable batch.
    pub async fn fetch_incremental(&self, cancel: &CancelFlag) -> Result<FetchOutcome> {
        let since = match self.store.latest_report_date(cot_core::SOURCE_TAG).await? {
            Some(latest) => latest - chrono::Duration::days(self.config.watermark_margin_days),
            None => self.config.epoch_floor,
        };
        tracing::info!(%since, "incremental fetch");
        self.run_fetch(Some(since), cancel).await
    }

    /// Fetches the full history inline, optionally bounded to recent years.
    ///
    /// Holds the job slot for the duration, so it excludes (and is excluded
    /// by) spawned runs.
    ///
    /// # Errors
    /// Returns `RunInProgress` while another run is active; otherwise the
    /// same failure modes as [`fetch_incremental`](Self::fetch_incremental).
    pub async fn fetch_full(
        &self,
        years_back: Option<u32>,
        cancel: &CancelFlag,
    ) -> Result<FetchOutcome> {
        let guard = self.jobs.try_acquire()?;
        let result = self.fetch_full_inner(years_back, cancel).await;
        match &result {
            Ok(_) => guard.complete(),
            Err(err) => guard.fail(err.to_string()),
        }
        result
    }

    /// Spawns a full refetch in the background job slot.
    ///
    /// # Errors
    /// Returns `RunInProgress` while another run is active.
    pub fn spawn_full_refetch(&self, years_back: Option<u32>) -> Result<JobHandle> {
        let service = self.clone();
        self.jobs.try_spawn("full_refetch", move |cancel| async move {
            service.fetch_full_inner(years_back, &cancel).await?;
            Ok(())
        })
    }

    /// Spawns a reconciliation pass in the background job slot.
    ///
    /// # Errors
    /// Returns `RunInProgress` while another run is active.
    pub fn spawn_reconcile(&self) -> Result<JobHandle> {
        let service = self.clone();
        self.jobs.try_spawn("reconcile", move |_cancel| async move {
            service.reconcile_inner().await?;
            Ok(())
        })
    }

    /// Runs one reconciliation pass inline, holding the job slot.
    ///
    /// # Errors
    /// Returns `RunInProgress` while another run is active; otherwise
    /// propagates fetch and storage failures.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        let guard = self.jobs.try_acquire()?;
        let result = self.reconcile_inner().await;
        match &result {
            Ok(_) => guard.complete(),
            Err(err) => guard.fail(err.to_string()),
        }
        result
    }

    async fn fetch_full_inner(
        &self,
        years_back: Option<u32>,
        cancel: &CancelFlag,
    ) -> Result<FetchOutcome> {
        let since = self.full_fetch_floor(years_back, Utc::now().date_naive());
        tracing::info!(%since, "full fetch");
        self.run_fetch(Some(since), cancel).await
    }

    async fn reconcile_inner(&self) -> Result<ReconcileOutcome> {
        Reconciler::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
        )
        .reconcile()
        .await
    }

    /// Reports stored coverage against the source's newest report date.
    ///
    /// # Errors
    /// Propagates fetch and storage failures.
    pub async fn status(&self) -> Result<DatasetStatus> {
        let total_reports = self.store.count(cot_core::SOURCE_TAG).await?;
        let range = self.store.date_range(cot_core::SOURCE_TAG).await?;
        let source_latest = self.client.latest_report_date().await?;

        let latest = range.map(|(_, latest)| latest);
        let is_up_to_date = match (latest, source_latest) {
            (Some(stored), Some(source)) => stored >= source,
            _ => false,
        };

        Ok(DatasetStatus {
            total_reports,
            earliest: range.map(|(earliest, _)| earliest),
            latest,
            source_latest,
            is_up_to_date,
        })
    }

    /// State of the most recent background job.
    #[must_use]
    pub fn job_state(&self) -> JobState {
        self.jobs.current_state()
    }

    /// Sequential page loop shared by the fetch entry points.
    ///
    /// Pages are fetched newest first and each page is persisted before the
    /// next request, so a cancelled or failed run leaves only whole batches
    /// behind. A short or empty page terminates the run; the page cap is a
    /// backstop against a runaway offset.
    async fn run_fetch(&self, since: Option<NaiveDate>, cancel: &CancelFlag) -> Result<FetchOutcome> {
        let upserter = Upserter::new(Arc::clone(&self.store), self.config.batch_attempts)
            .with_retry_delay(self.persist_retry_delay);
        let page_size = self.config.page_size;

        let started = std::time::Instant::now();
        let mut outcome = FetchOutcome::default();
        let mut offset: u64 = 0;

        while outcome.pages < self.config.max_pages {
            if cancel.is_cancelled() {
                tracing::info!(pages = outcome.pages, "fetch cancelled");
                break;
            }

            let records = self.client.fetch_page(since, offset, page_size).await?;
            outcome.pages += 1;
            if records.is_empty() {
                break;
            }
            let page_len = records.len();
            outcome.fetched += page_len as u64;

            let mut batch = Vec::with_capacity(page_len);
            for raw in &records {
                let resolution = self
                    .registry
                    .resolve(raw.contract_code(), raw.market_name());
                match resolution.market().and_then(|m| transformer::transform(raw, m.id)) {
                    Some(report) => batch.push(report),
                    None => outcome.skipped += 1,
                }
            }
            outcome.matched += batch.len() as u64;
            outcome.persisted += upserter.persist(&batch).await? as u64;

            if page_len < page_size as usize {
                break;
            }
            offset += u64::from(page_size);
        }

        if outcome.pages >= self.config.max_pages {
            tracing::warn!(pages = outcome.pages, "fetch stopped at page cap");
        }
        outcome.duration = started.elapsed();
        tracing::info!(
            pages = outcome.pages,
            fetched = outcome.fetched,
            matched = outcome.matched,
            skipped = outcome.skipped,
            persisted = outcome.persisted,
            duration_ms = outcome.duration.as_millis() as u64,
            "fetch run complete"
        );
        Ok(outcome)
    }

    fn full_fetch_floor(&self, years_back: Option<u32>, today: NaiveDate) -> NaiveDate {
        match years_back {
            None => self.config.epoch_floor,
            Some(years) => {
                let floor = today - chrono::Duration::days(i64::from(years) * 365);
                floor.max(self.config.epoch_floor)
            }
        }
    }
}
