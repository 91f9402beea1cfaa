//! Dense serial-number assignment for arbitrary ordered items.
//!
//! Downstream stages compress k-mers, sequence ids, and similar values into
//! dense integer ids usable as array indexes. [`SerialRegistry`] assigns
//! each distinct item the next id in insertion order and answers lookups in
//! both directions; ids are always a bijection onto `[0, len)`.

use std::collections::BTreeMap;

use crate::error::{RegistryError, Result};

/// Bidirectional mapping between items and densely packed ascending ids.
///
/// The item-to-id direction is an ordered map over the item's `Ord`; the
/// id-to-item direction is an append-only vector indexed by id.
#[derive(Debug, Clone)]
pub struct SerialRegistry<T: Ord + Clone> {
    items: Vec<T>,
    ids: BTreeMap<T, usize>,
}

impl<T: Ord + Clone> Default for SerialRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> SerialRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: BTreeMap::new(),
        }
    }

    /// Returns the item's existing id, or assigns the next one
    pub fn intern(&mut self, item: T) -> usize {
        if let Some(&id) = self.ids.get(&item) {
            return id;
        }
        let id = self.items.len();
        self.items.push(item.clone());
        self.ids.insert(item, id);
        id
    }

    /// Assigns a fresh id; fails if the item already holds one
    pub fn insert_new(&mut self, item: T) -> Result<usize> {
        if self.ids.contains_key(&item) {
            return Err(RegistryError::AlreadyAssigned.into());
        }
        Ok(self.intern(item))
    }

    /// The item's id; fails if the item holds none
    pub fn id_of(&self, item: &T) -> Result<usize> {
        self.try_id_of(item)
            .ok_or_else(|| RegistryError::NotAssigned.into())
    }

    /// The item's id, or `None` when it holds none
    #[must_use]
    pub fn try_id_of(&self, item: &T) -> Option<usize> {
        self.ids.get(item).copied()
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.ids.contains_key(item)
    }

    /// The item assigned the given id
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&T> {
        self.items.get(id)
    }

    /// Number of distinct items registered
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Highest assigned id, or `None` when the registry is empty
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    /// `(id, item)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items.iter().enumerate()
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn ids_are_dense_and_repeatable() {
        let mut registry = SerialRegistry::new();
        let mut seen = Vec::new();
        for item in ["kmer-a", "kmer-b", "kmer-a", "kmer-c", "kmer-b"] {
            seen.push(registry.intern(item));
        }
        assert_eq!(seen, vec![0, 1, 0, 2, 1]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.last(), Some(2));

        // ids form a permutation of [0, len)
        let mut ids: Vec<usize> = (0..registry.len())
            .map(|id| registry.try_id_of(registry.get(id).unwrap()).unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn both_directions_agree() {
        let mut registry = SerialRegistry::new();
        registry.intern("x".to_string());
        registry.intern("y".to_string());

        assert_eq!(registry.get(1), Some(&"y".to_string()));
        assert_eq!(registry.id_of(&"y".to_string()).unwrap(), 1);
        assert!(registry.contains(&"x".to_string()));
        assert!(!registry.contains(&"z".to_string()));
    }

    #[test]
    fn insert_new_rejects_duplicates() {
        let mut registry = SerialRegistry::new();
        assert_eq!(registry.insert_new(42).unwrap(), 0);
        assert!(registry.insert_new(42).is_err());
    }

    #[test]
    fn hard_lookup_fails_on_absent_items() {
        let registry: SerialRegistry<u32> = SerialRegistry::new();
        assert!(registry.id_of(&7).is_err());
        assert_eq!(registry.try_id_of(&7), None);
        assert_eq!(registry.last(), None);
    }
}
