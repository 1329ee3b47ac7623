//! Ingestion and reconciliation pipeline for the COT aggregator.
//!
//! This crate provides:
//! - Entity resolution from raw source records to catalog markets
//! - Normalization and conflict-safe batched persistence
//! - Derived metrics, moving averages, and extreme-positioning trends
//! - Stored-vs-source reconciliation with tolerances
//! - A single-slot background job runner with cooperative cancellation

pub mod error;
pub mod job;
pub mod metrics;
pub mod reconciler;
pub mod resolver;
pub mod service;
pub mod store;
pub mod transformer;
pub mod upserter;

pub use error::IngestError;
pub use job::{CancelFlag, JobHandle, JobRunner, JobState, SlotGuard};
pub use metrics::{compute_metrics, compute_trends, ExtremeFlags, DEFAULT_PERIODS};
pub use reconciler::{ReconcileOutcome, Reconciler, ValidationFinding};
pub use resolver::{Registry, Resolution};
pub use service::{CotService, DatasetStatus, FetchOutcome};
pub use store::ReportStore;
pub use upserter::Upserter;
