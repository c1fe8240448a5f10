//! Typed record and storage-unit model shared with the host.
//!
//! The host's record-loading collaborator constructs these values and passes
//! them by reference into every call. Identifiers are opaque strings owned by
//! the host; this crate never interprets them beyond equality.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque identifier classifying a host record (e.g. "content-item").
pub type RecordType = String;

/// Opaque sub-classification within a record type (e.g. "article").
pub type SubType = String;

/// Opaque identifier for the kind of a storage unit (e.g. "text").
pub type StorageKind = String;

/// Opaque identifier of one host record.
pub type RecordId = String;

/// Identifier of a provider, explicit or derived.
pub type ProviderId = String;

/// One stored value inside a storage unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUnitValue {
    /// Textual payload of the value.
    pub value: String,
}

impl StorageUnitValue {
    /// Create a new storage unit value.
    pub fn new<S: Into<String>>(value: S) -> Self {
        StorageUnitValue {
            value: value.into(),
        }
    }
}

impl From<&str> for StorageUnitValue {
    fn from(value: &str) -> Self {
        StorageUnitValue::new(value)
    }
}

/// Description of one data container attached to a record sub-type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUnitDescriptor {
    /// Identity of this unit instance, unique within its sub-type.
    pub unit_id: String,

    /// Storage kind of the unit, matched against extractor declarations.
    pub kind: StorageKind,

    /// Column reference substituted for the virtual synonym column when a
    /// condition is translated into this unit's native query fragment.
    pub native_column: String,
}

impl StorageUnitDescriptor {
    /// Create a new storage unit descriptor.
    pub fn new<S: Into<String>>(unit_id: S, kind: S, native_column: S) -> Self {
        StorageUnitDescriptor {
            unit_id: unit_id.into(),
            kind: kind.into(),
            native_column: native_column.into(),
        }
    }
}

/// A loaded host record with the unit values relevant to synonym handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Host-owned record identifier.
    pub id: RecordId,

    /// Record type of this record.
    pub record_type: RecordType,

    /// Sub-type of this record.
    pub sub_type: SubType,

    /// Human-facing label of the record, resolved by the host.
    pub label: String,

    /// Values per storage unit id, in storage order.
    pub unit_values: HashMap<String, Vec<StorageUnitValue>>,
}

impl Record {
    /// Create a new record with no unit values.
    pub fn new<S: Into<String>>(id: S, record_type: S, sub_type: S, label: S) -> Self {
        Record {
            id: id.into(),
            record_type: record_type.into(),
            sub_type: sub_type.into(),
            label: label.into(),
            unit_values: HashMap::new(),
        }
    }

    /// Append a value to a storage unit on this record.
    pub fn push_value<S: Into<String>>(&mut self, unit_id: S, value: StorageUnitValue) {
        self.unit_values.entry(unit_id.into()).or_default().push(value);
    }

    /// Values stored in the given unit, empty if the unit holds nothing.
    pub fn values_for(&self, unit_id: &str) -> &[StorageUnitValue] {
        self.unit_values
            .get(unit_id)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }
}

/// Description of how a trunk record's storage must change to incorporate a
/// merged record's label.
///
/// Produced by a provider's merge capability; persistence is the host's
/// responsibility. Applying a mutation appends, it never replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMutation {
    /// Record whose storage changes.
    pub record_id: RecordId,

    /// Storage unit receiving the appended value.
    pub unit_id: String,

    /// Value appended to the unit.
    pub appended: StorageUnitValue,
}

impl RecordMutation {
    /// Apply this mutation to an in-memory record, appending the value and
    /// keeping every prior value in place.
    pub fn apply_to(&self, record: &mut Record) {
        record.push_value(self.unit_id.clone(), self.appended.clone());
    }
}

/// Host-side inventory of the storage units attached to each sub-type.
pub trait StorageUnitInventory: Send + Sync {
    /// Storage units attached to `sub_type`, in the host's configured order.
    fn storage_units_for(&self, sub_type: &str) -> Vec<StorageUnitDescriptor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_for_absent_unit() {
        let record = Record::new("1", "content-item", "article", "First");
        assert!(record.values_for("aliases").is_empty());
    }

    #[test]
    fn test_push_value_preserves_order() {
        let mut record = Record::new("1", "content-item", "article", "First");
        record.push_value("aliases", StorageUnitValue::new("a"));
        record.push_value("aliases", StorageUnitValue::new("b"));

        let values: Vec<_> = record
            .values_for("aliases")
            .iter()
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_mutation_appends() {
        let mut record = Record::new("1", "content-item", "article", "First");
        record.push_value("aliases", StorageUnitValue::new("a"));

        let mutation = RecordMutation {
            record_id: "1".to_string(),
            unit_id: "aliases".to_string(),
            appended: StorageUnitValue::new("b"),
        };
        mutation.apply_to(&mut record);

        let values: Vec<_> = record
            .values_for("aliases")
            .iter()
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }
}
