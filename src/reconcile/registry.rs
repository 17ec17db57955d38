use std::collections::{BTreeMap, BTreeSet};

use crate::dom::ElementRef;

/// Registry record of one materialized node.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RegistryEntry {
    /// Live element.
    pub element: ElementRef,
    /// Class applied before an animated removal.
    pub exit_animation_id: Option<String>,
    /// Destroy hook fired when the node is collected.
    pub destroy_id: Option<u32>,
}

/// Identifier to live element, one entry per identifier.
#[derive(Clone, Debug, Default)]
pub struct LiveNodeRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl LiveNodeRegistry {
    /// Insert or replace the entry for `id`.
    pub fn insert(&mut self, id: impl Into<String>, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(id.into(), entry)
    }

    /// Entry of `id`.
    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Remove and return the entry of `id`.
    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove and return every entry for which `pred` holds, in identifier order.
    pub fn drain_where(
        &mut self,
        mut pred: impl FnMut(&str, &RegistryEntry) -> bool,
    ) -> Vec<(String, RegistryEntry)> {
        let ids: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, v)| pred(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        ids.into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|e| (id, e)))
            .collect()
    }
}

/// Identifiers visited during the current pass. Rebuilt from scratch every pass.
#[derive(Clone, Debug, Default)]
pub struct ActiveIdentifierSet {
    ids: BTreeSet<String>,
}

impl ActiveIdentifierSet {
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Record a visit.
    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Visited identifiers in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/registry.rs"]
mod tests;
