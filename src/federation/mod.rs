//! Federation of synonym operations across resolved providers.
//!
//! This module provides functionality to:
//! - Fan one search out across every resolved provider concurrently
//! - Merge per-provider results in provider-list order
//! - Skip failing or slow providers and accumulate diagnostics
//! - Run extraction and merge over the same resolution path

pub mod config;
pub mod engine;
pub mod metrics;
pub mod task;

pub use config::{FederationConfig, SearchOptions};
pub use engine::{FederatedExtraction, FederatedMerge, FederatedSearch, FederationEngine};
pub use metrics::{FederationMetrics, FederationMetricsCollector};
pub use task::{ProviderFailure, SearchTask, TaskOutcome};
