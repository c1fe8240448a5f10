//! Contributor registration: explicit providers, extractors and override
//! steps.
//!
//! A contributor is one module's declaration of what it adds to the system.
//! Contributors are gathered once at startup; their registration order is the
//! order explicit providers appear in resolved lists and the order override
//! steps run in.

use std::sync::Arc;

use crate::extractor::Extractor;
use crate::provider::Provider;
use crate::registry::behavior::Behavior;

/// Resolution key handed to contributors while a provider list is built.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Record type being resolved.
    pub record_type: &'a str,

    /// Sub-type being resolved.
    pub sub_type: &'a str,

    /// Behavior being resolved.
    pub behavior: &'a Behavior,
}

/// One module's contribution of providers, extractors and overrides.
pub trait Contributor: Send + Sync {
    /// Machine name of this contributor.
    fn id(&self) -> &str;

    /// Explicit providers for this exact (record-type, sub-type, behavior)
    /// key. Declarative only; most contributors return an empty list for
    /// keys they do not serve.
    fn providers(&self, _ctx: &ResolutionContext<'_>) -> Vec<Arc<dyn Provider>> {
        Vec::new()
    }

    /// Extractors this contributor ships, independent of any resolution key.
    fn extractors(&self) -> Vec<Arc<dyn Extractor>> {
        Vec::new()
    }

    /// Override step over the combined provider list. Steps run in
    /// contributor-registration order; per provider id, the last write wins.
    fn alter(&self, _list: &mut ProviderList, _ctx: &ResolutionContext<'_>) {}
}

/// Ordered provider list with id-addressed override operations.
///
/// Order is position order: replacing keeps a provider's position, removing
/// closes the gap, adding appends. This keeps resolved lists stable across
/// identical registration states.
#[derive(Default)]
pub struct ProviderList {
    entries: Vec<Arc<dyn Provider>>,
}

impl ProviderList {
    /// Create an empty list.
    pub fn new() -> Self {
        ProviderList {
            entries: Vec::new(),
        }
    }

    /// Add a provider. If a provider with the same id is already present it
    /// is replaced in place (last write wins), otherwise the provider is
    /// appended.
    pub fn push(&mut self, provider: Arc<dyn Provider>) {
        match self.position(provider.id()) {
            Some(index) => self.entries[index] = provider,
            None => self.entries.push(provider),
        }
    }

    /// Replace the provider with `id`, keeping its position. Returns false if
    /// no such provider is present.
    pub fn replace(&mut self, id: &str, provider: Arc<dyn Provider>) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries[index] = provider;
                true
            }
            None => false,
        }
    }

    /// Remove the provider with `id`. Returns false if no such provider is
    /// present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether a provider with `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Number of providers in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the providers in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.entries.iter()
    }

    /// Consume the list into its ordered entries.
    pub fn into_entries(self) -> Vec<Arc<dyn Provider>> {
        self.entries
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|p| p.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Extraction;
    use crate::record::Record;

    struct Stub {
        id: String,
        label: String,
    }

    impl Stub {
        fn new(id: &str, label: &str) -> Arc<dyn Provider> {
            Arc::new(Stub {
                id: id.to_string(),
                label: label.to_string(),
            })
        }
    }

    impl Extraction for Stub {
        fn extract_synonyms(&self, _record: &Record) -> crate::error::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    impl Provider for Stub {
        fn id(&self) -> &str {
            &self.id
        }

        fn label(&self) -> &str {
            &self.label
        }

        fn extraction(&self) -> Option<&dyn Extraction> {
            Some(self)
        }
    }

    fn ids(list: &ProviderList) -> Vec<String> {
        list.iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn test_push_appends_and_last_write_wins() {
        let mut list = ProviderList::new();
        list.push(Stub::new("a", "first"));
        list.push(Stub::new("b", "second"));
        list.push(Stub::new("a", "overridden"));

        assert_eq!(ids(&list), vec!["a", "b"]);
        assert_eq!(list.iter().next().unwrap().label(), "overridden");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = ProviderList::new();
        list.push(Stub::new("a", "first"));
        list.push(Stub::new("b", "second"));

        assert!(list.replace("a", Stub::new("a", "replacement")));
        assert_eq!(ids(&list), vec!["a", "b"]);
        assert_eq!(list.iter().next().unwrap().label(), "replacement");

        assert!(!list.replace("missing", Stub::new("missing", "x")));
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut list = ProviderList::new();
        list.push(Stub::new("a", "first"));
        list.push(Stub::new("b", "second"));
        list.push(Stub::new("c", "third"));

        assert!(list.remove("b"));
        assert!(!list.remove("b"));
        assert_eq!(ids(&list), vec!["a", "c"]);
        assert!(list.contains("a"));
        assert!(!list.contains("b"));
        assert_eq!(list.len(), 2);
    }
}
