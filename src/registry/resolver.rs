//! Provider resolution and caching.
//!
//! Resolution combines explicit providers, derived field providers and
//! contributor override steps into one ordered list per (record-type,
//! sub-type, behavior) key, then caches it. Lists are built outside the cache
//! lock and published atomically: concurrent readers observe either a fully
//! built entry or none. Invalidation bumps a generation counter and clears
//! the cache; in-flight readers keep their immutable snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::{Result, SynonymsError};
use crate::provider::{FieldProvider, Provider, ProviderInfo};
use crate::record::StorageUnitInventory;
use crate::registry::behavior::{Behavior, BehaviorRegistry};
use crate::registry::contributor::{Contributor, ProviderList, ResolutionContext};
use crate::storage::StorageBackend;

/// Cache key for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    /// Record type component of the key.
    pub record_type: String,

    /// Sub-type component of the key.
    pub sub_type: String,

    /// Behavior component of the key.
    pub behavior: String,
}

impl ResolutionKey {
    /// Create a resolution key.
    pub fn new<S: Into<String>>(record_type: S, sub_type: S, behavior: S) -> Self {
        ResolutionKey {
            record_type: record_type.into(),
            sub_type: sub_type.into(),
            behavior: behavior.into(),
        }
    }
}

/// One cache generation's immutable resolution for a key.
pub struct ResolvedProviders {
    /// Providers in resolution order: explicit (contributor order), then
    /// derived (contributor order, discovery order within a contributor),
    /// after override steps.
    pub providers: Vec<Arc<dyn Provider>>,

    /// Cache generation this list was built in.
    pub generation: u64,
}

impl std::fmt::Debug for ResolvedProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProviders")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.id()).collect::<Vec<_>>(),
            )
            .field("generation", &self.generation)
            .finish()
    }
}

/// Registry resolving and caching provider lists.
pub struct ProviderRegistry {
    behaviors: BehaviorRegistry,
    contributors: Vec<Arc<dyn Contributor>>,
    inventory: Arc<dyn StorageUnitInventory>,
    backend: Arc<dyn StorageBackend>,
    cache: RwLock<AHashMap<ResolutionKey, Arc<ResolvedProviders>>>,
    generation: AtomicU64,
}

impl ProviderRegistry {
    /// Create a registry over the host's behavior set, storage-unit
    /// inventory and backend.
    pub fn new(
        behaviors: BehaviorRegistry,
        inventory: Arc<dyn StorageUnitInventory>,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        ProviderRegistry {
            behaviors,
            contributors: Vec::new(),
            inventory,
            backend,
            cache: RwLock::new(AHashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Register a contributor. Called once per module at startup, before the
    /// registry is shared; duplicate contributor ids are a configuration
    /// error.
    pub fn register_contributor(&mut self, contributor: Arc<dyn Contributor>) -> Result<()> {
        if self.contributors.iter().any(|c| c.id() == contributor.id()) {
            return Err(SynonymsError::configuration(format!(
                "contributor '{}' is already registered",
                contributor.id()
            )));
        }
        self.contributors.push(contributor);
        Ok(())
    }

    /// The behavior registry backing resolution.
    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    /// Current cache generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate every cached resolution, e.g. after a configuration
    /// change. Subsequent resolutions rebuild from scratch.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().clear();
    }

    /// Resolve the ordered provider list for a key, from cache when
    /// possible.
    ///
    /// An unknown behavior fails with a configuration error; a key with no
    /// providers configured resolves to a valid empty list.
    pub fn resolve(
        &self,
        record_type: &str,
        sub_type: &str,
        behavior: &str,
    ) -> Result<Arc<ResolvedProviders>> {
        let behavior = self.behaviors.get(behavior)?;
        let key = ResolutionKey::new(record_type, sub_type, behavior.name.as_str());

        if let Some(hit) = self.cache.read().get(&key) {
            return Ok(Arc::clone(hit));
        }

        // Build outside the lock; only the publish is serialized.
        let generation = self.generation.load(Ordering::SeqCst);
        let built = Arc::new(self.build(&key, behavior, generation)?);

        let mut cache = self.cache.write();
        if let Some(hit) = cache.get(&key) {
            return Ok(Arc::clone(hit));
        }
        // Publish only if no invalidation happened during the build; the
        // stale list is still safe for this caller.
        if self.generation.load(Ordering::SeqCst) == generation {
            cache.insert(key, Arc::clone(&built));
        }
        Ok(built)
    }

    /// Resolve a key into descriptive provider infos, for host and UI
    /// listings.
    pub fn resolve_provider_infos(
        &self,
        record_type: &str,
        sub_type: &str,
        behavior: &str,
    ) -> Result<Vec<ProviderInfo>> {
        let resolved = self.resolve(record_type, sub_type, behavior)?;
        Ok(resolved
            .providers
            .iter()
            .map(|p| ProviderInfo::describe(p.as_ref()))
            .collect())
    }

    fn build(
        &self,
        key: &ResolutionKey,
        behavior: &Behavior,
        generation: u64,
    ) -> Result<ResolvedProviders> {
        let ctx = ResolutionContext {
            record_type: &key.record_type,
            sub_type: &key.sub_type,
            behavior,
        };
        let mut list = ProviderList::new();

        // 1. Explicit providers, contributor-registration order.
        for contributor in &self.contributors {
            for provider in contributor.providers(&ctx) {
                list.push(provider);
            }
        }

        // 2. Derived providers from the sub-type's storage units and every
        //    compatible extractor, discovery order within each contributor.
        let units = self.inventory.storage_units_for(&key.sub_type);
        for contributor in &self.contributors {
            for extractor in contributor.extractors() {
                for unit in &units {
                    if extractor.supports_kind(&unit.kind) {
                        list.push(Arc::new(FieldProvider::new(
                            Arc::clone(&extractor),
                            unit.clone(),
                            Arc::clone(&self.backend),
                        )));
                    }
                }
            }
        }

        // 3. Override steps, contributor-registration order.
        for contributor in &self.contributors {
            contributor.alter(&mut list, &ctx);
        }

        // 4. Every resolved provider must carry the behavior's required
        //    capabilities; a gap is a malformed registration, not a silent
        //    skip.
        for provider in list.iter() {
            for capability in behavior.required_capabilities() {
                if !provider.has_capability(capability) {
                    return Err(SynonymsError::configuration(format!(
                        "provider '{}' lacks the {:?} capability required by behavior '{}'",
                        provider.id(),
                        capability,
                        behavior.name
                    )));
                }
            }
        }

        Ok(ResolvedProviders {
            providers: list.into_entries(),
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::TextExtractor;
    use crate::registry::contributor::ResolutionContext;
    use crate::storage::{MemoryBackend, MemoryInventory};
    use crate::record::StorageUnitDescriptor;

    struct FieldContributor;

    impl Contributor for FieldContributor {
        fn id(&self) -> &str {
            "field"
        }

        fn extractors(&self) -> Vec<Arc<dyn crate::extractor::Extractor>> {
            vec![Arc::new(TextExtractor::new())]
        }
    }

    struct RemovingContributor {
        remove_id: String,
    }

    impl Contributor for RemovingContributor {
        fn id(&self) -> &str {
            "remover"
        }

        fn alter(&self, list: &mut ProviderList, _ctx: &ResolutionContext<'_>) {
            list.remove(&self.remove_id);
        }
    }

    fn registry_with(contributors: Vec<Arc<dyn Contributor>>) -> ProviderRegistry {
        let inventory = MemoryInventory::new();
        inventory.attach(
            "article",
            StorageUnitDescriptor::new("aliases", "text", "aliases.value"),
        );
        inventory.attach(
            "article",
            StorageUnitDescriptor::new("nicknames", "text", "nicknames.value"),
        );

        let mut behaviors = BehaviorRegistry::new();
        behaviors.register(Behavior::autocomplete()).unwrap();

        let mut registry = ProviderRegistry::new(
            behaviors,
            Arc::new(inventory),
            Arc::new(MemoryBackend::new()),
        );
        for contributor in contributors {
            registry.register_contributor(contributor).unwrap();
        }
        registry
    }

    fn resolved_ids(registry: &ProviderRegistry) -> Vec<String> {
        registry
            .resolve("content-item", "article", "autocomplete")
            .unwrap()
            .providers
            .iter()
            .map(|p| p.id().to_string())
            .collect()
    }

    #[test]
    fn test_derived_providers_per_unit() {
        let registry = registry_with(vec![Arc::new(FieldContributor)]);
        assert_eq!(resolved_ids(&registry), vec!["text:aliases", "text:nicknames"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = registry_with(vec![Arc::new(FieldContributor)]);
        let first = resolved_ids(&registry);
        for _ in 0..10 {
            assert_eq!(resolved_ids(&registry), first);
        }
    }

    #[test]
    fn test_alteration_removes_targeted_derived_provider() {
        let registry = registry_with(vec![
            Arc::new(FieldContributor),
            Arc::new(RemovingContributor {
                remove_id: FieldProvider::derived_id("text", "aliases"),
            }),
        ]);
        assert_eq!(resolved_ids(&registry), vec!["text:nicknames"]);
    }

    #[test]
    fn test_unknown_behavior_fails_loudly() {
        let registry = registry_with(vec![Arc::new(FieldContributor)]);
        let error = registry
            .resolve("content-item", "article", "no-such-behavior")
            .unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_empty_resolution_is_valid() {
        let registry = registry_with(Vec::new());
        let resolved = registry
            .resolve("content-item", "article", "autocomplete")
            .unwrap();
        assert!(resolved.providers.is_empty());
    }

    #[test]
    fn test_invalidation_bumps_generation() {
        let registry = registry_with(vec![Arc::new(FieldContributor)]);

        let before = registry
            .resolve("content-item", "article", "autocomplete")
            .unwrap();
        registry.invalidate();
        let after = registry
            .resolve("content-item", "article", "autocomplete")
            .unwrap();

        assert_eq!(before.generation + 1, after.generation);
        // The old snapshot stays usable for in-flight readers.
        assert_eq!(before.providers.len(), after.providers.len());
    }

    #[test]
    fn test_duplicate_contributor_is_configuration_error() {
        let mut registry = registry_with(vec![Arc::new(FieldContributor)]);
        let error = registry
            .register_contributor(Arc::new(FieldContributor))
            .unwrap_err();
        assert!(error.is_configuration());
    }
}
