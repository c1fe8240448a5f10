//! Generic provider synthesized from an extractor and one storage unit.
//!
//! This is the leverage point of the design: a module contributes one
//! reusable [`Extractor`] and automatically gains a full provider for every
//! sub-type and storage-unit instance of a compatible kind, instead of
//! hand-writing a provider per combination.

use std::sync::Arc;

use crate::condition::{ConditionBuilder, ConditionNode, substitute_placeholder};
use crate::error::Result;
use crate::extractor::Extractor;
use crate::provider::{Extraction, Merge, Provider, Search, SynonymMatch};
use crate::record::{Record, RecordMutation, StorageUnitDescriptor};
use crate::storage::StorageBackend;

/// A derived provider adapting the per-unit extractor contract into the
/// per-record provider contract for one storage unit instance.
pub struct FieldProvider {
    id: String,
    label: String,
    extractor: Arc<dyn Extractor>,
    unit: StorageUnitDescriptor,
    backend: Arc<dyn StorageBackend>,
}

impl FieldProvider {
    /// Deterministic id of the provider derived from (`extractor_id`,
    /// `unit_id`). Override rules target derived providers through this id.
    pub fn derived_id(extractor_id: &str, unit_id: &str) -> String {
        format!("{extractor_id}:{unit_id}")
    }

    /// Synthesize a provider from an extractor and one storage unit.
    pub fn new(
        extractor: Arc<dyn Extractor>,
        unit: StorageUnitDescriptor,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let id = Self::derived_id(extractor.id(), &unit.unit_id);
        let label = format!("{} on {}", extractor.label(), unit.unit_id);
        FieldProvider {
            id,
            label,
            extractor,
            unit,
            backend,
        }
    }

    /// The storage unit this provider is scoped to.
    pub fn unit(&self) -> &StorageUnitDescriptor {
        &self.unit
    }
}

impl Provider for FieldProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_derived(&self) -> bool {
        true
    }

    fn extraction(&self) -> Option<&dyn Extraction> {
        Some(self)
    }

    fn merge(&self) -> Option<&dyn Merge> {
        Some(self)
    }

    fn search(&self) -> Option<&dyn Search> {
        Some(self)
    }
}

impl Extraction for FieldProvider {
    fn extract_synonyms(&self, record: &Record) -> Result<Vec<String>> {
        let values = record.values_for(&self.unit.unit_id);
        Ok(self.extractor.extract(values, &self.unit, record))
    }
}

impl Merge for FieldProvider {
    fn merge_as_synonym(
        &self,
        trunk: &Record,
        synonym_record: &Record,
    ) -> Result<Option<RecordMutation>> {
        // Append, never overwrite: the mutation only describes an added
        // value, prior unit values stay untouched.
        Ok(self
            .extractor
            .merge_as_value(&synonym_record.label, synonym_record)
            .map(|appended| RecordMutation {
                record_id: trunk.id.clone(),
                unit_id: self.unit.unit_id.clone(),
                appended,
            }))
    }
}

impl Search for FieldProvider {
    fn find_synonyms(&self, condition: &ConditionNode) -> Result<Vec<SynonymMatch>> {
        // Rewrite every virtual-column leaf through the extractor, scoped to
        // this one unit. Any unsupported leaf declines the whole condition
        // before a backend is touched.
        let rewritten = condition.map_leaves(&mut |operator, operand| {
            let builder = ConditionBuilder::new(operator, &self.unit);
            self.extractor
                .build_search_fragment(operand, &builder, &self.unit)
        });
        let Some(rewritten) = rewritten else {
            return Ok(Vec::new());
        };

        let fragment = substitute_placeholder(&rewritten, &self.unit.native_column);
        let rows = self.backend.execute(&fragment, &self.unit)?;
        Ok(rows
            .into_iter()
            .map(|(record_id, synonym)| SynonymMatch {
                record_id,
                synonym,
                provider_id: self.id.clone(),
            })
            .collect())
    }
}
