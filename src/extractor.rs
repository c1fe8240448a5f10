//! Per-storage-kind extractor plugins.
//!
//! An extractor declares which storage kinds it can read and supplies the
//! three per-unit operations (extract, build-search-fragment, merge-as-value)
//! from which full providers are synthesized generically. One extractor
//! registration gains synonym support for every sub-type and storage unit
//! where a compatible kind appears.

use crate::condition::{ConditionBuilder, ConditionNode};
use crate::record::{Record, StorageKind, StorageUnitDescriptor, StorageUnitValue};

/// A reusable, storage-kind-scoped synonym plugin.
pub trait Extractor: Send + Sync {
    /// Machine name of this extractor, unique process-wide.
    fn id(&self) -> &str;

    /// Human-friendly name of this extractor.
    fn label(&self) -> &str;

    /// Storage kinds this extractor can read.
    fn supported_storage_kinds(&self) -> Vec<StorageKind>;

    /// Pull synonym strings out of one unit's values for one record.
    ///
    /// Pure: no side effects, deterministic for a given record state. Absent
    /// or empty values yield an empty sequence, never an error.
    fn extract(
        &self,
        values: &[StorageUnitValue],
        unit: &StorageUnitDescriptor,
        record: &Record,
    ) -> Vec<String>;

    /// Build the per-unit constraint for `term` with the builder's bound
    /// operator, or `None` when no value of this unit can possibly match.
    ///
    /// Returning `None` short-circuits the unit: no query is executed against
    /// its backend. An operator the unit cannot express natively must also
    /// yield `None`, never a silently downgraded comparison.
    fn build_search_fragment(
        &self,
        term: &str,
        builder: &ConditionBuilder<'_>,
        unit: &StorageUnitDescriptor,
    ) -> Option<ConditionNode>;

    /// Convert a resolved label from a to-be-merged record into the value
    /// shape this unit stores, or `None` when the label cannot be converted.
    fn merge_as_value(&self, label: &str, source_record: &Record) -> Option<StorageUnitValue>;

    /// Whether this extractor can read units of `kind`.
    fn supports_kind(&self, kind: &str) -> bool {
        self.supported_storage_kinds().iter().any(|k| k == kind)
    }
}

/// Extractor for plain-text storage units: every stored string is a synonym.
///
/// The reference extractor shipped with the crate; hosts with structured
/// storage kinds register their own [`Extractor`] implementations.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    kinds: Vec<StorageKind>,
}

impl TextExtractor {
    /// Create a text extractor for the default "text" storage kind.
    pub fn new() -> Self {
        TextExtractor {
            kinds: vec!["text".to_string()],
        }
    }

    /// Create a text extractor covering the given storage kinds.
    pub fn with_kinds(kinds: Vec<StorageKind>) -> Self {
        TextExtractor { kinds }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for TextExtractor {
    fn id(&self) -> &str {
        "text"
    }

    fn label(&self) -> &str {
        "Plain text"
    }

    fn supported_storage_kinds(&self) -> Vec<StorageKind> {
        self.kinds.clone()
    }

    fn extract(
        &self,
        values: &[StorageUnitValue],
        _unit: &StorageUnitDescriptor,
        _record: &Record,
    ) -> Vec<String> {
        values
            .iter()
            .filter(|v| !v.value.is_empty())
            .map(|v| v.value.clone())
            .collect()
    }

    fn build_search_fragment(
        &self,
        term: &str,
        builder: &ConditionBuilder<'_>,
        _unit: &StorageUnitDescriptor,
    ) -> Option<ConditionNode> {
        if term.is_empty() {
            // An empty term cannot name a synonym; skip the query entirely.
            return None;
        }
        Some(builder.term(term))
    }

    fn merge_as_value(&self, label: &str, _source_record: &Record) -> Option<StorageUnitValue> {
        if label.is_empty() {
            return None;
        }
        Some(StorageUnitValue::new(label))
    }
}
