//! Retrying batch writer.
//!
//! Wraps the storage seam with a bounded retry so a transient database
//! hiccup does not abort a long backfill. When the budget is exhausted the
//! run halts; batches already committed stay committed.

use std::sync::Arc;
use std::time::Duration;

use cot_data::NewCotReport;

use crate::error::{IngestError, Result};
use crate::store::ReportStore;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Persists normalized report batches with bounded retry.
pub struct Upserter<S: ReportStore> {
    store: Arc<S>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<S: ReportStore> Upserter<S> {
    #[must_use]
    pub fn new(store: Arc<S>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Overrides the delay between attempts. Tests shorten it.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Writes one batch, retrying whole-batch on failure.
    ///
    /// The batch is a single transaction downstream, so a retry never
    /// double-applies a partial write. Returns rows written.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::PersistFailed` when every attempt failed.
    pub async fn persist(&self, reports: &[NewCotReport]) -> Result<usize> {
        if reports.is_empty() {
            return Ok(0);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.upsert_batch(reports).await {
                Ok(written) => {
                    tracing::debug!(rows = written, attempt, "persisted report batch");
                    return Ok(written);
                }
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "batch write failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    return Err(IngestError::PersistFailed {
                        attempts: attempt,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
