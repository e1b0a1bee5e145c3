//! Result types produced by sync runs and credential checks.
//!
//! All of these are ephemeral per-run values. Persisting them (dashboards,
//! sync history) is the host's concern.

use serde::{Deserialize, Serialize};

/// Aggregated outcome of a full catalog sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether the run itself completed. Individual batch failures do not
    /// clear this flag; only a disabled feature or a setup-level error does.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Products accepted by the review platform.
    pub synced: usize,
    /// Products rejected or never submitted.
    pub failed: usize,
    /// One entry per build failure, batch failure, or upstream error.
    pub errors: Vec<String>,
    /// Candidate products found in the catalog.
    pub total: usize,
    /// Number of batches the run was partitioned into.
    pub total_batches: usize,
}

impl SyncReport {
    /// Run refused because product sync is disabled for the scope.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            success: false,
            message: "Product sync is disabled".to_string(),
            synced: 0,
            failed: 0,
            errors: Vec::new(),
            total: 0,
            total_batches: 0,
        }
    }

    /// Successful run over an empty candidate set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: true,
            message: "No products found to sync".to_string(),
            synced: 0,
            failed: 0,
            errors: Vec::new(),
            total: 0,
            total_batches: 0,
        }
    }

    /// Run aborted by a setup-level failure before any batching began.
    #[must_use]
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Critical error: {error}"),
            synced: 0,
            failed: 0,
            errors: vec![error.to_string()],
            total: 0,
            total_batches: 0,
        }
    }
}

/// Outcome of a single bulk upsert request.
///
/// The bulk endpoint has no per-item granularity: an error response marks the
/// whole submitted batch as failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
}

impl BatchOutcome {
    /// Entire batch of `count` products failed with `error`.
    #[must_use]
    pub fn all_failed(count: usize, error: impl Into<String>) -> Self {
        Self {
            success_count: 0,
            failed_count: count,
            errors: vec![error.into()],
        }
    }

    /// Entire batch of `count` products was accepted.
    #[must_use]
    pub const fn all_synced(count: usize) -> Self {
        Self {
            success_count: count,
            failed_count: 0,
            errors: Vec::new(),
        }
    }
}

/// Progress snapshot delivered to a sync observer after each batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// 1-based index of the batch that just completed.
    pub current_batch: usize,
    pub total_batches: usize,
    /// Cumulative counts across the run so far.
    pub synced: usize,
    pub failed: usize,
    pub total: usize,
    /// Counts for this batch alone.
    pub batch_success: usize,
    pub batch_failed: usize,
}

/// Outcome of a credential validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub success: bool,
    pub message: String,
}

impl ValidationOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
