//! # Synonyms
//!
//! A capability-based synonyms provider registry with federated search.
//!
//! Hosts attach arbitrary stored values to structured records; this crate
//! lets those values act as synonyms of their records — extracted, merged in
//! during record consolidation, and searched — without the host knowing how
//! each kind of value is stored.
//!
//! ## Features
//!
//! - Storage-agnostic condition trees with a single substitution step per
//!   backend
//! - Capability interfaces (extraction, merge, search) dispatched per
//!   (record-type, sub-type, behavior)
//! - Generic field providers synthesized from reusable per-storage-kind
//!   extractors
//! - Deterministic provider resolution with contributor overrides and an
//!   atomically published cache
//! - Concurrent search federation with per-provider timeouts and
//!   partial-result diagnostics

pub mod condition;
pub mod error;
pub mod extractor;
pub mod federation;
pub mod provider;
pub mod record;
pub mod registry;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
