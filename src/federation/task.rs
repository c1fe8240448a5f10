//! Per-provider task bookkeeping for the federated fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::condition::ConditionNode;
use crate::error::SynonymsError;
use crate::provider::{Provider, SynonymMatch};

/// A search task targeting one resolved provider.
pub struct SearchTask {
    /// Unique identifier for this task.
    pub task_id: String,

    /// Position of the provider in the resolved list. Result merge order is
    /// list order, so outcomes are reassembled by ordinal, never by
    /// completion order.
    pub ordinal: usize,

    /// Provider to query.
    pub provider: Arc<dyn Provider>,

    /// Condition to search with, virtual-column leaves unresolved.
    pub condition: ConditionNode,

    /// Maximum matches to keep from this provider.
    pub max_matches: usize,
}

impl SearchTask {
    /// Create a new search task.
    pub fn new(
        ordinal: usize,
        provider: Arc<dyn Provider>,
        condition: ConditionNode,
        max_matches: usize,
    ) -> Self {
        let task_id = format!("{}_{}", provider.id(), uuid::Uuid::new_v4());
        Self {
            task_id,
            ordinal,
            provider,
            condition,
            max_matches,
        }
    }
}

/// Handle for cancelling an in-flight task.
pub struct TaskHandle {
    /// Task ID.
    pub task_id: String,

    /// Cancellation token.
    cancel_token: AtomicBool,
}

impl TaskHandle {
    /// Create a new task handle.
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            cancel_token: AtomicBool::new(false),
        }
    }

    /// Cancel the task.
    pub fn cancel(&self) {
        self.cancel_token.store(true, Ordering::SeqCst);
    }

    /// Check if the task is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.load(Ordering::SeqCst)
    }
}

/// Result of executing one search task.
pub struct TaskOutcome {
    /// Ordinal of the provider in the resolved list.
    pub ordinal: usize,

    /// Provider this outcome belongs to.
    pub provider_id: String,

    /// Matches if the task succeeded.
    pub matches: Option<Vec<SynonymMatch>>,

    /// Error if the task failed.
    pub error: Option<SynonymsError>,

    /// Execution time for this task.
    pub execution_time: Duration,
}

impl TaskOutcome {
    /// Create a successful outcome.
    pub fn success(
        ordinal: usize,
        provider_id: String,
        matches: Vec<SynonymMatch>,
        execution_time: Duration,
    ) -> Self {
        Self {
            ordinal,
            provider_id,
            matches: Some(matches),
            error: None,
            execution_time,
        }
    }

    /// Create a failed outcome.
    pub fn failure(
        ordinal: usize,
        provider_id: String,
        error: SynonymsError,
        execution_time: Duration,
    ) -> Self {
        Self {
            ordinal,
            provider_id,
            matches: None,
            error: Some(error),
            execution_time,
        }
    }

    /// Check if the task succeeded.
    pub fn is_success(&self) -> bool {
        self.matches.is_some() && self.error.is_none()
    }
}

/// Diagnostics entry for a provider skipped during federation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider that was skipped.
    pub provider_id: String,

    /// Cause of the skip.
    pub error: String,

    /// Whether the provider was skipped for exceeding the timeout budget.
    pub timed_out: bool,
}

impl ProviderFailure {
    /// Diagnostics entry for a failed provider call.
    pub fn new(provider_id: &str, error: &SynonymsError) -> Self {
        ProviderFailure {
            provider_id: provider_id.to_string(),
            error: error.to_string(),
            timed_out: matches!(error, SynonymsError::Timeout(_)),
        }
    }

    /// Diagnostics entry for a provider cut off by the timeout budget.
    pub fn timed_out(provider_id: &str) -> Self {
        ProviderFailure {
            provider_id: provider_id.to_string(),
            error: SynonymsError::timeout("federated search budget exceeded").to_string(),
            timed_out: true,
        }
    }
}
