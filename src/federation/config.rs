//! Configuration for federated search execution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the federation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Timeout budget for one federated search. Providers still running when
    /// the budget is spent are cancelled and reported as skipped.
    pub default_timeout: Duration,

    /// Maximum matches collected from each provider.
    pub max_matches_per_provider: usize,

    /// Thread pool size for the fan-out.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Whether to collect federation metrics.
    pub enable_metrics: bool,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            max_matches_per_provider: 1000,
            thread_pool_size: None,
            enable_metrics: true,
        }
    }
}

/// Options for a specific federated search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Timeout override for this search.
    pub timeout: Option<Duration>,

    /// Per-provider match limit override for this search.
    pub max_matches_per_provider: Option<usize>,
}

impl SearchOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this search.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the per-provider match limit for this search.
    pub fn with_max_matches_per_provider(mut self, max: usize) -> Self {
        self.max_matches_per_provider = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FederationConfig::default();
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert_eq!(config.max_matches_per_provider, 1000);
        assert!(config.thread_pool_size.is_none());
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new()
            .with_timeout(Duration::from_millis(250))
            .with_max_matches_per_provider(10);
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.max_matches_per_provider, Some(10));
    }
}
