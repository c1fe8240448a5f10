//! Behavior definitions and their process-wide registry.
//!
//! A behavior names a capability family ("autocomplete", "exact-match") and
//! declares what it requires of providers. Every behavior requires the
//! extraction and merge capabilities; search-capable behaviors additionally
//! fix the operator they query the virtual synonym column with.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionOperator;
use crate::error::{Result, SynonymsError};
use crate::provider::Capability;

/// A named capability family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    /// Machine name, unique process-wide.
    pub name: String,

    /// Human-friendly name.
    pub label: String,

    /// Operator this behavior queries the virtual synonym column with.
    /// `None` for behaviors without a search capability.
    pub search_operator: Option<ConditionOperator>,
}

impl Behavior {
    /// Create a behavior without a search capability.
    pub fn new<S: Into<String>>(name: S, label: S) -> Self {
        Behavior {
            name: name.into(),
            label: label.into(),
            search_operator: None,
        }
    }

    /// Add a search capability querying with `operator`.
    pub fn with_search_operator(mut self, operator: ConditionOperator) -> Self {
        self.search_operator = Some(operator);
        self
    }

    /// The standard autocomplete behavior: prefix search.
    pub fn autocomplete() -> Self {
        Behavior::new("autocomplete", "Autocomplete").with_search_operator(ConditionOperator::Prefix)
    }

    /// The standard exact-match behavior: equality search.
    pub fn exact_match() -> Self {
        Behavior::new("exact-match", "Exact match").with_search_operator(ConditionOperator::Equals)
    }

    /// Capabilities a provider must implement to serve this behavior.
    pub fn required_capabilities(&self) -> Vec<Capability> {
        let mut capabilities = vec![Capability::Extraction, Capability::Merge];
        if self.search_operator.is_some() {
            capabilities.push(Capability::Search);
        }
        capabilities
    }
}

/// Registry of behaviors, populated once at startup.
#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    behaviors: Vec<Behavior>,
}

impl BehaviorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BehaviorRegistry {
            behaviors: Vec::new(),
        }
    }

    /// Register a behavior. Duplicate names are a configuration error.
    pub fn register(&mut self, behavior: Behavior) -> Result<()> {
        if self.behaviors.iter().any(|b| b.name == behavior.name) {
            return Err(SynonymsError::configuration(format!(
                "behavior '{}' is already registered",
                behavior.name
            )));
        }
        self.behaviors.push(behavior);
        Ok(())
    }

    /// Look up a behavior by name.
    ///
    /// An unknown name is a loud configuration error: callers must be able to
    /// distinguish "no providers configured" from "behavior does not exist".
    pub fn get(&self, name: &str) -> Result<&Behavior> {
        self.behaviors
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| {
                SynonymsError::configuration(format!("unknown behavior '{name}'"))
            })
    }

    /// All registered behaviors, in registration order.
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }
}
