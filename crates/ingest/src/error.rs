//! Error types for the ingestion pipeline.

use cot_source::SourceError;
use thiserror::Error;

/// Errors surfaced by ingestion and reconciliation runs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upstream fetch failed (retry budget already exhausted downstream).
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A batch could not be persisted within the retry budget. The run
    /// halts; batches committed before this point remain valid.
    #[error("persist failed after {attempts} attempts: {message}")]
    PersistFailed {
        /// Attempts made at the batch level.
        attempts: u32,
        /// Last underlying storage error.
        message: String,
    },

    /// A refetch or reconcile run is already active for this dataset.
    /// The trigger is rejected, never queued.
    #[error("a refetch or reconcile run is already in progress")]
    RunInProgress,

    /// Storage-layer failure outside the batched write path.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_failed_display() {
        let err = IngestError::PersistFailed {
            attempts: 3,
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_source_error_converts() {
        let err: IngestError = SourceError::Timeout("deadline".to_string()).into();
        assert!(matches!(err, IngestError::Source(_)));
    }
}
