//! Provider capability contracts and search result values.
//!
//! A provider supplies synonym semantics for one (record-type, sub-type,
//! behavior) combination by implementing one or more capability interfaces:
//! [`Extraction`], [`Merge`] and [`Search`]. Providers are either explicit
//! (hand-written, registered by a contributor) or derived (synthesized from
//! an extractor and a storage unit by [`field_provider::FieldProvider`]).

pub mod field_provider;

use serde::{Deserialize, Serialize};

use crate::condition::ConditionNode;
use crate::error::Result;
use crate::record::{ProviderId, Record, RecordId, RecordMutation};

pub use field_provider::FieldProvider;

/// The atomic unit of a federated search result. A value object: no identity
/// beyond its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymMatch {
    /// Record the matched synonym belongs to.
    pub record_id: RecordId,

    /// Synonym text that satisfied the condition.
    pub synonym: String,

    /// Provider the match originated from.
    pub provider_id: ProviderId,
}

/// Capability interfaces a provider may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Extract synonym strings from a loaded record.
    Extraction,

    /// Describe how a record incorporates another record as a synonym.
    Merge,

    /// Look up records by synonym through a storage backend.
    Search,
}

/// Extraction capability: pull synonyms out of one loaded record.
pub trait Extraction: Send + Sync {
    /// Synonyms found on `record`, in storage order. Deterministic for a
    /// given record state.
    fn extract_synonyms(&self, record: &Record) -> Result<Vec<String>>;
}

/// Merge capability: incorporate one record as a synonym of another.
pub trait Merge: Send + Sync {
    /// Describe how `trunk` must change to hold `synonym_record`'s label as a
    /// synonym. `None` means the label cannot be converted into this
    /// provider's storage shape; that is a silent no-op, not an error.
    /// Nothing is persisted here — the host applies the mutation.
    fn merge_as_synonym(
        &self,
        trunk: &Record,
        synonym_record: &Record,
    ) -> Result<Option<RecordMutation>>;
}

/// Search capability: find records whose synonyms satisfy a condition.
pub trait Search: Send + Sync {
    /// Matches for `condition`, in this provider's native storage order.
    ///
    /// The condition references the virtual synonym column; the provider must
    /// either fully resolve every placeholder into its native column or
    /// decline by returning an empty vector *without executing any query*.
    fn find_synonyms(&self, condition: &ConditionNode) -> Result<Vec<SynonymMatch>>;
}

/// A synonym provider: an identity plus the capabilities it implements.
pub trait Provider: Send + Sync {
    /// Machine name of this provider, unique within a resolved list.
    fn id(&self) -> &str;

    /// Human-friendly name of this provider.
    fn label(&self) -> &str;

    /// Whether this provider was synthesized from an extractor.
    fn is_derived(&self) -> bool {
        false
    }

    /// Extraction capability, if implemented.
    fn extraction(&self) -> Option<&dyn Extraction> {
        None
    }

    /// Merge capability, if implemented.
    fn merge(&self) -> Option<&dyn Merge> {
        None
    }

    /// Search capability, if implemented.
    fn search(&self) -> Option<&dyn Search> {
        None
    }

    /// Capabilities this provider implements.
    fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = Vec::new();
        if self.extraction().is_some() {
            capabilities.push(Capability::Extraction);
        }
        if self.merge().is_some() {
            capabilities.push(Capability::Merge);
        }
        if self.search().is_some() {
            capabilities.push(Capability::Search);
        }
        capabilities
    }

    /// Whether this provider implements `capability`.
    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Extraction => self.extraction().is_some(),
            Capability::Merge => self.merge().is_some(),
            Capability::Search => self.search().is_some(),
        }
    }
}

/// Descriptive view of a resolved provider, for host and UI listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider machine name.
    pub id: String,

    /// Human-friendly provider name.
    pub label: String,

    /// Capabilities the provider implements.
    pub capabilities: Vec<Capability>,

    /// Whether the provider was derived from an extractor.
    pub derived: bool,
}

impl ProviderInfo {
    /// Describe a provider.
    pub fn describe(provider: &dyn Provider) -> Self {
        ProviderInfo {
            id: provider.id().to_string(),
            label: provider.label().to_string(),
            capabilities: provider.capabilities(),
            derived: provider.is_derived(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ExtractionOnly;

    impl Extraction for ExtractionOnly {
        fn extract_synonyms(&self, _record: &Record) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    impl Provider for ExtractionOnly {
        fn id(&self) -> &str {
            "extraction-only"
        }

        fn label(&self) -> &str {
            "Extraction only"
        }

        fn extraction(&self) -> Option<&dyn Extraction> {
            Some(self)
        }
    }

    #[test]
    fn test_capability_discovery() {
        let provider = ExtractionOnly;
        assert_eq!(provider.capabilities(), vec![Capability::Extraction]);
        assert!(provider.has_capability(Capability::Extraction));
        assert!(!provider.has_capability(Capability::Search));
        assert!(!provider.is_derived());
    }

    #[test]
    fn test_provider_info() {
        let info = ProviderInfo::describe(&ExtractionOnly);
        assert_eq!(info.id, "extraction-only");
        assert_eq!(info.capabilities, vec![Capability::Extraction]);
        assert!(!info.derived);
    }

    #[test]
    fn test_synonym_match_serialization() {
        let m = SynonymMatch {
            record_id: "42".to_string(),
            synonym: "Foobar".to_string(),
            provider_id: "text:aliases".to_string(),
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: SynonymMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
