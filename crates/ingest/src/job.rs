//! Single-slot background job runner.
//!
//! Long-running work (full refetch, reconciliation) runs in a spawned task
//! with observable status and cooperative cancellation. At most one job is
//! active at a time; a second trigger is rejected, never queued.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{IngestError, Result};

/// Lifecycle of one background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Failed(String),
}

impl JobState {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running)
    }
}

/// Cooperative cancellation token handed to job bodies.
///
/// Jobs poll it at batch boundaries; setting it never interrupts an
/// in-flight batch, so cancelled runs stop at a consistent point.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to one spawned job.
#[derive(Debug)]
pub struct JobHandle {
    status: watch::Receiver<JobState>,
    cancel: CancelFlag,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Current job state.
    #[must_use]
    pub fn state(&self) -> JobState {
        self.status.borrow().clone()
    }

    /// Requests cancellation; the job stops at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the job to finish and returns its final state.
    pub async fn join(self) -> JobState {
        // A panicked body never advances the status past Running.
        if self.task.await.is_err() {
            return JobState::Failed("job task panicked".to_string());
        }
        self.status.borrow().clone()
    }
}

/// Exclusive claim on the runner's slot for an inline run.
///
/// Inline reconcile and full-fetch calls hold one of these so they exclude
/// spawned jobs (and each other) exactly like a background run.
#[derive(Debug)]
pub struct SlotGuard {
    status: Option<watch::Sender<JobState>>,
}

impl SlotGuard {
    /// Marks the run completed and releases the slot.
    pub fn complete(mut self) {
        if let Some(tx) = self.status.take() {
            let _ = tx.send(JobState::Completed);
        }
    }

    /// Marks the run failed and releases the slot.
    pub fn fail(mut self, message: impl Into<String>) {
        if let Some(tx) = self.status.take() {
            let _ = tx.send(JobState::Failed(message.into()));
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.status.take() {
            let _ = tx.send(JobState::Failed("run aborted".to_string()));
        }
    }
}

/// Spawns background jobs, holding at most one active slot.
#[derive(Clone, Default)]
pub struct JobRunner {
    active: Arc<Mutex<Option<watch::Receiver<JobState>>>>,
}

impl JobRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the most recently spawned job, if any.
    #[must_use]
    pub fn current_state(&self) -> JobState {
        self.active
            .lock()
            .expect("job slot lock")
            .as_ref()
            .map_or(JobState::Idle, |rx| rx.borrow().clone())
    }

    /// Claims the slot for an inline run.
    ///
    /// The returned guard publishes `Running` immediately; the caller must
    /// finish it with [`SlotGuard::complete`] or [`SlotGuard::fail`]. A
    /// guard dropped unfinished marks the run `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::RunInProgress` while a previous run is still
    /// active.
    pub fn try_acquire(&self) -> Result<SlotGuard> {
        let mut slot = self.active.lock().expect("job slot lock");
        if let Some(rx) = slot.as_ref() {
            if rx.borrow().is_running() {
                return Err(IngestError::RunInProgress);
            }
        }

        let (tx, rx) = watch::channel(JobState::Running);
        *slot = Some(rx);
        Ok(SlotGuard { status: Some(tx) })
    }

    /// Spawns a job if the slot is free.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::RunInProgress` while a previous job is still
    /// running.
    pub fn try_spawn<F, Fut>(&self, name: &'static str, body: F) -> Result<JobHandle>
    where
        F: FnOnce(CancelFlag) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut slot = self.active.lock().expect("job slot lock");
        if let Some(rx) = slot.as_ref() {
            if rx.borrow().is_running() {
                return Err(IngestError::RunInProgress);
            }
        }

        let (tx, rx) = watch::channel(JobState::Running);
        let cancel = CancelFlag::new();
        let flag = cancel.clone();

        let task = tokio::spawn(async move {
            tracing::info!(job = name, "background job started");
            match body(flag).await {
                Ok(()) => {
                    tracing::info!(job = name, "background job completed");
                    let _ = tx.send(JobState::Completed);
                }
                Err(err) => {
                    tracing::error!(job = name, error = %err, "background job failed");
                    let _ = tx.send(JobState::Failed(err.to_string()));
                }
            }
        });

        *slot = Some(rx.clone());
        Ok(JobHandle {
            status: rx,
            cancel,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_job_completes_and_frees_slot() {
        let runner = JobRunner::new();
        let handle = runner
            .try_spawn("noop", |_cancel| async { Ok(()) })
            .unwrap();

        assert_eq!(handle.join().await, JobState::Completed);
        assert_eq!(runner.current_state(), JobState::Completed);

        // Slot is free again after completion.
        let handle = runner
            .try_spawn("noop", |_cancel| async { Ok(()) })
            .unwrap();
        assert_eq!(handle.join().await, JobState::Completed);
    }

    #[tokio::test]
    async fn test_second_spawn_while_running_is_rejected() {
        let runner = JobRunner::new();
        let handle = runner
            .try_spawn("slow", |_cancel| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .unwrap();

        let err = runner
            .try_spawn("rejected", |_cancel| async { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, IngestError::RunInProgress));

        assert_eq!(handle.join().await, JobState::Completed);
    }

    #[tokio::test]
    async fn test_failure_is_observable() {
        let runner = JobRunner::new();
        let handle = runner
            .try_spawn("failing", |_cancel| async {
                anyhow::bail!("backfill exploded")
            })
            .unwrap();

        match handle.join().await {
            JobState::Failed(message) => assert!(message.contains("backfill exploded")),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_is_debuggable() {
        let runner = JobRunner::new();
        let handle = runner
            .try_spawn("noop", |_cancel| async { Ok(()) })
            .unwrap();

        assert!(format!("{handle:?}").contains("JobHandle"));
        handle.join().await;
    }

    #[tokio::test]
    async fn test_acquired_slot_excludes_spawns() {
        let runner = JobRunner::new();
        let guard = runner.try_acquire().unwrap();
        assert!(runner.current_state().is_running());

        let err = runner
            .try_spawn("rejected", |_cancel| async { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, IngestError::RunInProgress));
        assert!(matches!(
            runner.try_acquire().unwrap_err(),
            IngestError::RunInProgress
        ));

        guard.complete();
        assert_eq!(runner.current_state(), JobState::Completed);
        let handle = runner
            .try_spawn("noop", |_cancel| async { Ok(()) })
            .unwrap();
        assert_eq!(handle.join().await, JobState::Completed);
    }

    #[tokio::test]
    async fn test_failed_and_dropped_guards_release_the_slot() {
        let runner = JobRunner::new();
        runner.try_acquire().unwrap().fail("reconcile exploded");
        match runner.current_state() {
            JobState::Failed(message) => assert!(message.contains("reconcile exploded")),
            other => panic!("unexpected state: {other:?}"),
        }

        drop(runner.try_acquire().unwrap());
        assert!(matches!(runner.current_state(), JobState::Failed(_)));
        assert!(runner.try_acquire().is_ok());
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_body() {
        let runner = JobRunner::new();
        let handle = runner
            .try_spawn("cancellable", |cancel| async move {
                for _ in 0..100 {
                    if cancel.is_cancelled() {
                        return Ok(());
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                anyhow::bail!("never cancelled")
            })
            .unwrap();

        handle.cancel();
        assert_eq!(handle.join().await, JobState::Completed);
    }
}
