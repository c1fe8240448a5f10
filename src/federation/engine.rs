//! Federation engine: one logical operation fanned out across every resolved
//! provider.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::RecvTimeoutError;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::condition::ConditionNode;
use crate::error::{Result, SynonymsError};
use crate::federation::config::{FederationConfig, SearchOptions};
use crate::federation::metrics::{FederationMetrics, FederationMetricsCollector, Timer};
use crate::federation::task::{ProviderFailure, SearchTask, TaskHandle, TaskOutcome};
use crate::provider::{ProviderInfo, SynonymMatch};
use crate::record::{Record, RecordMutation};
use crate::registry::ProviderRegistry;

/// Result of one federated search: matches in provider-list order plus
/// diagnostics for every skipped provider.
///
/// No deduplication is performed — a record legitimately appears once per
/// matching synonym — and no re-sorting: ranking is a caller concern.
#[derive(Debug, Clone)]
pub struct FederatedSearch {
    /// Matches, provider-list order, native order within a provider.
    pub matches: Vec<SynonymMatch>,

    /// Providers skipped because their search failed or timed out.
    pub failures: Vec<ProviderFailure>,
}

/// Result of federated extraction over one record.
#[derive(Debug, Clone)]
pub struct FederatedExtraction {
    /// Synonyms in provider-list order, storage order within a provider.
    pub synonyms: Vec<String>,

    /// Providers skipped because their extraction failed.
    pub failures: Vec<ProviderFailure>,
}

/// Result of a federated merge: one mutation per provider that accepted the
/// merge. The host applies and persists them.
#[derive(Debug, Clone)]
pub struct FederatedMerge {
    /// Mutations in provider-list order.
    pub mutations: Vec<RecordMutation>,

    /// Providers skipped because their merge failed.
    pub failures: Vec<ProviderFailure>,
}

/// Engine dispatching synonym operations across resolved providers.
pub struct FederationEngine {
    /// Registry resolving provider lists.
    registry: Arc<ProviderRegistry>,

    /// Configuration for the engine.
    config: FederationConfig,

    /// Thread pool for the search fan-out.
    thread_pool: Arc<ThreadPool>,

    /// Metrics collector.
    metrics: Arc<FederationMetricsCollector>,
}

impl FederationEngine {
    /// Create a new federation engine over a registry.
    pub fn new(registry: Arc<ProviderRegistry>, config: FederationConfig) -> Result<Self> {
        let thread_pool_size = config.thread_pool_size.unwrap_or_else(num_cpus::get);

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(thread_pool_size)
            .thread_name(|i| format!("synonyms-federation-{i}"))
            // A panicking worker must not take the process down; its missing
            // outcome surfaces as a failure diagnostic instead.
            .panic_handler(|_| {})
            .build()
            .map_err(|e| SynonymsError::other(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            registry,
            config,
            thread_pool: Arc::new(thread_pool),
            metrics: Arc::new(FederationMetricsCollector::new()),
        })
    }

    /// The registry backing this engine.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Resolved providers for a key, as descriptive infos.
    pub fn resolve_providers(
        &self,
        record_type: &str,
        sub_type: &str,
        behavior: &str,
    ) -> Result<Vec<ProviderInfo>> {
        self.registry
            .resolve_provider_infos(record_type, sub_type, behavior)
    }

    /// Search `term` across every provider resolved for the key, with default
    /// options.
    pub fn federate_search(
        &self,
        record_type: &str,
        sub_type: &str,
        behavior: &str,
        term: &str,
    ) -> Result<FederatedSearch> {
        self.federate_search_with(record_type, sub_type, behavior, term, SearchOptions::default())
    }

    /// Search `term` across every provider resolved for the key.
    ///
    /// The term is embedded into a single virtual-column condition with the
    /// behavior's operator. Providers run concurrently, each independently
    /// cancellable; output is buffered per provider and concatenated in
    /// provider-list order. Zero resolved providers yield an empty result,
    /// not an error.
    pub fn federate_search_with(
        &self,
        record_type: &str,
        sub_type: &str,
        behavior: &str,
        term: &str,
        options: SearchOptions,
    ) -> Result<FederatedSearch> {
        let timer = Timer::start();

        let definition = self.registry.behaviors().get(behavior)?;
        let operator = definition.search_operator.ok_or_else(|| {
            SynonymsError::configuration(format!(
                "behavior '{behavior}' does not define a search capability"
            ))
        })?;
        let resolved = self.registry.resolve(record_type, sub_type, behavior)?;

        if resolved.providers.is_empty() {
            return Ok(FederatedSearch {
                matches: Vec::new(),
                failures: Vec::new(),
            });
        }

        let condition = ConditionNode::leaf(operator, term);
        let max_matches = options
            .max_matches_per_provider
            .unwrap_or(self.config.max_matches_per_provider);

        let tasks: Vec<SearchTask> = resolved
            .providers
            .iter()
            .enumerate()
            .map(|(ordinal, provider)| {
                SearchTask::new(ordinal, Arc::clone(provider), condition.clone(), max_matches)
            })
            .collect();
        let provider_ids: Vec<String> = resolved
            .providers
            .iter()
            .map(|p| p.id().to_string())
            .collect();

        let outcomes = self.execute_tasks_parallel(tasks, &options);

        // Reassemble in provider-list order; slots left empty by the timeout
        // cutoff become skip diagnostics.
        let mut matches = Vec::new();
        let mut failures = Vec::new();
        for (ordinal, slot) in outcomes.into_iter().enumerate() {
            match slot {
                Some(outcome) => match outcome.matches {
                    Some(found) => matches.extend(found),
                    None => {
                        let error = outcome
                            .error
                            .unwrap_or_else(|| SynonymsError::other("provider produced no result"));
                        failures.push(ProviderFailure::new(&outcome.provider_id, &error));
                    }
                },
                None => failures.push(ProviderFailure::timed_out(&provider_ids[ordinal])),
            }
        }

        if self.config.enable_metrics {
            let timeouts = failures.iter().filter(|f| f.timed_out).count() as u64;
            self.metrics.record_search(
                timer.elapsed(),
                matches.len() as u64,
                failures.len() as u64,
                timeouts,
            );
        }

        Ok(FederatedSearch { matches, failures })
    }

    /// Extract synonyms from one loaded record through every provider
    /// resolved for its (record-type, sub-type) and the given behavior.
    pub fn extract_synonyms(&self, record: &Record, behavior: &str) -> Result<FederatedExtraction> {
        let resolved = self
            .registry
            .resolve(&record.record_type, &record.sub_type, behavior)?;

        let mut synonyms = Vec::new();
        let mut failures = Vec::new();
        for provider in &resolved.providers {
            let Some(extraction) = provider.extraction() else {
                continue;
            };
            match extraction.extract_synonyms(record) {
                Ok(found) => synonyms.extend(found),
                Err(error) => failures.push(ProviderFailure::new(provider.id(), &error)),
            }
        }
        Ok(FederatedExtraction { synonyms, failures })
    }

    /// Describe how `trunk` incorporates `synonym_record`'s label as a
    /// synonym, one mutation per provider that accepted the merge.
    pub fn merge_as_synonym(
        &self,
        trunk: &Record,
        synonym_record: &Record,
        behavior: &str,
    ) -> Result<FederatedMerge> {
        let resolved = self
            .registry
            .resolve(&trunk.record_type, &trunk.sub_type, behavior)?;

        let mut mutations = Vec::new();
        let mut failures = Vec::new();
        for provider in &resolved.providers {
            let Some(merge) = provider.merge() else {
                continue;
            };
            match merge.merge_as_synonym(trunk, synonym_record) {
                Ok(Some(mutation)) => mutations.push(mutation),
                Ok(None) => {} // cannot convert, silent no-op
                Err(error) => failures.push(ProviderFailure::new(provider.id(), &error)),
            }
        }
        Ok(FederatedMerge { mutations, failures })
    }

    /// Execute search tasks concurrently, collecting outcomes into slots
    /// indexed by provider ordinal until the timeout budget is spent.
    fn execute_tasks_parallel(
        &self,
        tasks: Vec<SearchTask>,
        options: &SearchOptions,
    ) -> Vec<Option<TaskOutcome>> {
        let num_tasks = tasks.len();
        let timeout = options.timeout.unwrap_or(self.config.default_timeout);
        let timer = Timer::start();
        let (tx, rx) = crossbeam_channel::unbounded();

        let provider_ids: Vec<String> = tasks
            .iter()
            .map(|task| task.provider.id().to_string())
            .collect();
        let handles: Vec<_> = tasks
            .iter()
            .map(|task| Arc::new(TaskHandle::new(task.task_id.clone())))
            .collect();

        for (task, handle) in tasks.into_iter().zip(handles.iter()) {
            let tx = tx.clone();
            let handle = Arc::clone(handle);

            self.thread_pool.spawn(move || {
                let outcome = Self::execute_single_task(task, handle);
                let _ = tx.send(outcome);
            });
        }

        // Drop the original sender so the receiver can observe completion.
        drop(tx);

        let deadline = Instant::now() + timeout;
        let mut slots: Vec<Option<TaskOutcome>> = (0..num_tasks).map(|_| None).collect();
        let mut received = 0;

        while received < num_tasks {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    let ordinal = outcome.ordinal;
                    slots[ordinal] = Some(outcome);
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Budget spent; cancel stragglers so a slow backend
                    // cannot stall anyone else. Empty slots become timed-out
                    // diagnostics upstream.
                    for handle in &handles {
                        handle.cancel();
                    }
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Every sender is gone yet some outcomes never arrived:
                    // those workers panicked before sending. Report them as
                    // worker failures, not timeouts.
                    for (ordinal, slot) in slots.iter_mut().enumerate() {
                        if slot.is_none() {
                            *slot = Some(TaskOutcome::failure(
                                ordinal,
                                provider_ids[ordinal].clone(),
                                SynonymsError::other(
                                    "search worker terminated without a result",
                                ),
                                timer.elapsed(),
                            ));
                        }
                    }
                    break;
                }
            }
        }

        slots
    }

    /// Execute a single search task.
    fn execute_single_task(task: SearchTask, handle: Arc<TaskHandle>) -> TaskOutcome {
        let timer = Timer::start();
        let provider_id = task.provider.id().to_string();

        if handle.is_cancelled() {
            return TaskOutcome::failure(
                task.ordinal,
                provider_id,
                SynonymsError::cancelled("search task cancelled"),
                timer.elapsed(),
            );
        }

        let Some(search) = task.provider.search() else {
            // Resolution validates capabilities, so this is a registration
            // gone inconsistent mid-flight.
            return TaskOutcome::failure(
                task.ordinal,
                provider_id.clone(),
                SynonymsError::configuration(format!(
                    "provider '{provider_id}' lost its search capability"
                )),
                timer.elapsed(),
            );
        };

        match search.find_synonyms(&task.condition) {
            Ok(mut matches) => {
                matches.truncate(task.max_matches);
                TaskOutcome::success(task.ordinal, provider_id, matches, timer.elapsed())
            }
            Err(error) => TaskOutcome::failure(task.ordinal, provider_id, error, timer.elapsed()),
        }
    }

    /// Get current metrics snapshot.
    pub fn metrics(&self) -> FederationMetrics {
        self.metrics.snapshot()
    }

    /// Reset metrics.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::TextExtractor;
    use crate::record::{StorageUnitDescriptor, StorageUnitValue};
    use crate::registry::{Behavior, BehaviorRegistry, Contributor, ProviderRegistry};
    use crate::storage::{MemoryBackend, MemoryInventory};

    struct FieldContributor;

    impl Contributor for FieldContributor {
        fn id(&self) -> &str {
            "field"
        }

        fn extractors(&self) -> Vec<Arc<dyn crate::extractor::Extractor>> {
            vec![Arc::new(TextExtractor::new())]
        }
    }

    fn engine_with_backend(backend: Arc<MemoryBackend>) -> FederationEngine {
        let inventory = MemoryInventory::new();
        inventory.attach(
            "article",
            StorageUnitDescriptor::new("aliases", "text", "aliases.value"),
        );

        let mut behaviors = BehaviorRegistry::new();
        behaviors.register(Behavior::autocomplete()).unwrap();
        behaviors.register(Behavior::exact_match()).unwrap();
        behaviors.register(Behavior::new("merge-only", "Merge only")).unwrap();

        let mut registry = ProviderRegistry::new(behaviors, Arc::new(inventory), backend);
        registry
            .register_contributor(Arc::new(FieldContributor))
            .unwrap();

        FederationEngine::new(Arc::new(registry), FederationConfig::default()).unwrap()
    }

    #[test]
    fn test_search_matches_prefix() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("1", "aliases", "Foobar");
        backend.insert("2", "aliases", "Other");
        let engine = engine_with_backend(backend);

        let results = engine
            .federate_search("content-item", "article", "autocomplete", "Foo")
            .unwrap();
        assert_eq!(results.matches.len(), 1);
        assert_eq!(results.matches[0].synonym, "Foobar");
        assert_eq!(results.matches[0].record_id, "1");
        assert!(results.failures.is_empty());
    }

    #[test]
    fn test_search_unknown_behavior_is_loud() {
        let engine = engine_with_backend(Arc::new(MemoryBackend::new()));
        let error = engine
            .federate_search("content-item", "article", "no-such-behavior", "x")
            .unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_search_requires_search_capable_behavior() {
        let engine = engine_with_backend(Arc::new(MemoryBackend::new()));
        let error = engine
            .federate_search("content-item", "article", "merge-only", "x")
            .unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_search_with_no_providers_is_silent() {
        let engine = engine_with_backend(Arc::new(MemoryBackend::new()));
        // No units are attached to this sub-type, so nothing resolves.
        let results = engine
            .federate_search("content-item", "page", "autocomplete", "Foo")
            .unwrap();
        assert!(results.matches.is_empty());
        assert!(results.failures.is_empty());
    }

    #[test]
    fn test_extraction_follows_resolution() {
        let engine = engine_with_backend(Arc::new(MemoryBackend::new()));

        let mut record = Record::new("1", "content-item", "article", "First");
        record.push_value("aliases", StorageUnitValue::new("Foobar"));

        let extraction = engine.extract_synonyms(&record, "autocomplete").unwrap();
        assert_eq!(extraction.synonyms, vec!["Foobar"]);
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn test_merge_produces_mutations() {
        let engine = engine_with_backend(Arc::new(MemoryBackend::new()));

        let trunk = Record::new("1", "content-item", "article", "First");
        let synonym_record = Record::new("2", "content-item", "article", "Second");

        let merge = engine
            .merge_as_synonym(&trunk, &synonym_record, "autocomplete")
            .unwrap();
        assert_eq!(merge.mutations.len(), 1);
        assert_eq!(merge.mutations[0].appended.value, "Second");
    }

    #[test]
    fn test_metrics_collection() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("1", "aliases", "Foobar");
        let engine = engine_with_backend(backend);

        let _ = engine
            .federate_search("content-item", "article", "autocomplete", "Foo")
            .unwrap();

        let metrics = engine.metrics();
        assert_eq!(metrics.total_searches, 1);
        assert_eq!(metrics.complete_searches, 1);
        assert_eq!(metrics.total_matches, 1);

        engine.reset_metrics();
        assert_eq!(engine.metrics().total_searches, 0);
    }
}
