//! Accumulating configuration snapshots.
//!
//! A snapshot is an immutable point-in-time view of everything the wizard has
//! collected so far. Forward transitions produce a *new* snapshot via
//! `merge`; nothing ever mutates a snapshot that history still references,
//! which is what makes back-navigation a plain value restoration.
//!
//! Merge semantics are shallow and last-write-wins: a field once set is
//! overwritten, never deleted, by a later step. Fields written on a branch
//! that later becomes irrelevant persist until overwritten or undone.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial mapping contributed by one step. Keys absent here are carried
/// over unchanged on merge.
pub type FieldUpdates = Map<String, Value>;

/// Immutable point-in-time configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    fields: Map<String, Value>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Convenience accessor for string-valued fields.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Pure shallow merge: produces a new snapshot, leaves `self` untouched.
    /// Later writes win; keys not present in `updates` carry over unchanged.
    #[must_use]
    pub fn merge(&self, updates: &FieldUpdates) -> ConfigSnapshot {
        let mut fields = self.fields.clone();
        for (key, value) in updates {
            fields.insert(key.clone(), value.clone());
        }
        ConfigSnapshot { fields }
    }

    /// Hand the collected fields over to whatever acts on them.
    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}
