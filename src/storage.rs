//! Storage backend boundary and the in-memory reference implementations.
//!
//! A backend executes one substituted query fragment against one storage
//! unit. Real deployments wire providers to their database; [`MemoryBackend`]
//! keeps rows in memory and is used by hosts without a query engine and by
//! tests. It counts executions so short-circuit behavior can be asserted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::condition::QueryFragment;
use crate::error::{Result, SynonymsError};
use crate::record::{Record, RecordId, StorageUnitDescriptor, StorageUnitInventory, SubType};

/// Executes substituted query fragments against a storage unit's backend.
pub trait StorageBackend: Send + Sync {
    /// Run `fragment` against the values stored in `unit`, returning
    /// (record id, matched value) rows in storage order.
    ///
    /// A fragment that still carries the virtual-column placeholder must be
    /// refused, never executed.
    fn execute(
        &self,
        fragment: &QueryFragment,
        unit: &StorageUnitDescriptor,
    ) -> Result<Vec<(RecordId, String)>>;
}

#[derive(Debug, Clone)]
struct MemoryRow {
    record_id: RecordId,
    unit_id: String,
    value: String,
}

/// In-memory storage backend holding unit values per record.
pub struct MemoryBackend {
    rows: RwLock<Vec<MemoryRow>>,
    execute_count: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        MemoryBackend {
            rows: RwLock::new(Vec::new()),
            execute_count: AtomicU64::new(0),
        }
    }

    /// Insert one value for a (record, unit) pair.
    pub fn insert<S: Into<String>>(&self, record_id: S, unit_id: S, value: S) {
        self.rows.write().push(MemoryRow {
            record_id: record_id.into(),
            unit_id: unit_id.into(),
            value: value.into(),
        });
    }

    /// Index every unit value of a record.
    pub fn index_record(&self, record: &Record) {
        let mut rows = self.rows.write();
        for (unit_id, values) in &record.unit_values {
            for value in values {
                rows.push(MemoryRow {
                    record_id: record.id.clone(),
                    unit_id: unit_id.clone(),
                    value: value.value.clone(),
                });
            }
        }
    }

    /// Number of fragments executed so far.
    pub fn execute_count(&self) -> u64 {
        self.execute_count.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn execute(
        &self,
        fragment: &QueryFragment,
        unit: &StorageUnitDescriptor,
    ) -> Result<Vec<(RecordId, String)>> {
        self.execute_count.fetch_add(1, Ordering::SeqCst);

        if fragment.has_placeholder() {
            return Err(SynonymsError::unresolved_placeholder(format!(
                "fragment for unit '{}' still references the virtual synonym column",
                unit.unit_id
            )));
        }

        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|row| row.unit_id == unit.unit_id && fragment.matches(&row.value))
            .map(|row| (row.record_id.clone(), row.value.clone()))
            .collect())
    }
}

/// In-memory storage-unit inventory, for hosts and tests.
pub struct MemoryInventory {
    units: RwLock<HashMap<SubType, Vec<StorageUnitDescriptor>>>,
}

impl MemoryInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        MemoryInventory {
            units: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a storage unit to a sub-type. Attachment order is the
    /// discovery order seen by resolution.
    pub fn attach<S: Into<String>>(&self, sub_type: S, unit: StorageUnitDescriptor) {
        self.units
            .write()
            .entry(sub_type.into())
            .or_default()
            .push(unit);
    }
}

impl Default for MemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageUnitInventory for MemoryInventory {
    fn storage_units_for(&self, sub_type: &str) -> Vec<StorageUnitDescriptor> {
        self.units
            .read()
            .get(sub_type)
            .cloned()
            .unwrap_or_default()
    }
}
