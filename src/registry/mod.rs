//! Provider registry: behavior definitions, contributor registration and
//! cached (record-type, sub-type, behavior) resolution.
//!
//! This module provides functionality to:
//! - Register behaviors with their required capability sets
//! - Gather contributors (explicit providers, extractors, override steps)
//! - Resolve keys into deterministic, order-stable provider lists
//! - Cache resolutions with atomic publish and explicit invalidation

pub mod behavior;
pub mod contributor;
pub mod resolver;

pub use behavior::{Behavior, BehaviorRegistry};
pub use contributor::{Contributor, ProviderList, ResolutionContext};
pub use resolver::{ProviderRegistry, ResolutionKey, ResolvedProviders};
