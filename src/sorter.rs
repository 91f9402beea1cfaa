//! Memory-scalable stable sorting by integer value.
//!
//! Alignment pipelines routinely need billions of `(id, value)` pairs
//! ordered by a bounded value such as a genomic coordinate. A comparison
//! tree pays `O(log n)` per insert and heavy per-node overhead at that
//! scale; [`BucketSorter`] instead addresses a slot directly by value, so an
//! insert is an amortized O(1) append and a full traversal comes out in
//! value order for free. Memory is proportional to the value range, not the
//! pair count.

/// Number of slots allocated per capacity growth
const GROWTH_BATCH: usize = 1 << 16;

/// Sentinel index marking the end of a slot chain
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
    head: usize,
    tail: usize,
}

const EMPTY_SLOT: Slot = Slot {
    head: NIL,
    tail: NIL,
};

#[derive(Debug, Clone, Copy)]
struct Node {
    id: u64,
    next: usize,
}

/// Stable sort-by-value structure over dense integer values starting at 0.
///
/// Each value owns a slot holding a chain of inserted ids in insertion
/// order; the slots live in one directly-indexed vector and the chain nodes
/// in a pooled arena, so no per-node allocation happens. Capacity only
/// grows, in large batches, and never shrinks.
#[derive(Debug, Default)]
pub struct BucketSorter {
    slots: Vec<Slot>,
    nodes: Vec<Node>,
}

impl BucketSorter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the slot vector for values up to `max_value`, avoiding
    /// growth during insertion when the value bound is known
    #[must_use]
    pub fn with_value_capacity(max_value: u64) -> Self {
        let mut sorter = Self::new();
        sorter.reserve_value(max_value);
        sorter
    }

    /// Appends `id` under `value`.
    ///
    /// Amortized O(1); the worst case is the slot-batch allocation on first
    /// access past the current capacity. Ids sharing a value keep their
    /// insertion order.
    pub fn add(&mut self, id: u64, value: u64) {
        self.reserve_value(value);
        let slot_at = value as usize;
        let node_at = self.nodes.len();
        self.nodes.push(Node { id, next: NIL });
        let slot = &mut self.slots[slot_at];
        if slot.head == NIL {
            slot.head = node_at;
        } else {
            self.nodes[slot.tail].next = node_at;
        }
        slot.tail = node_at;
    }

    /// Number of pairs added
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids in ascending value order, insertion order within equal values
    pub fn sorted_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.sorted_pairs().map(|(id, _)| id)
    }

    /// `(id, value)` pairs in ascending value order, insertion order within
    /// equal values
    #[must_use]
    pub fn sorted_pairs(&self) -> SortedPairs<'_> {
        SortedPairs {
            sorter: self,
            slot: 0,
            node: NIL,
        }
    }

    fn reserve_value(&mut self, value: u64) {
        let slot_at = value as usize;
        if slot_at >= self.slots.len() {
            let target = (slot_at / GROWTH_BATCH + 1) * GROWTH_BATCH;
            self.slots.resize(target, EMPTY_SLOT);
        }
    }
}

/// Lazy ascending traversal over a [`BucketSorter`]
pub struct SortedPairs<'a> {
    sorter: &'a BucketSorter,
    slot: usize,
    node: usize,
}

impl Iterator for SortedPairs<'_> {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.node == NIL {
            if self.slot >= self.sorter.slots.len() {
                return None;
            }
            self.node = self.sorter.slots[self.slot].head;
            self.slot += 1;
        }
        let node = self.sorter.nodes[self.node];
        let value = (self.slot - 1) as u64;
        self.node = node.next;
        Some((node.id, value))
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn sorts_by_value_with_stable_ties() {
        let mut sorter = BucketSorter::new();
        sorter.add(10, 3);
        sorter.add(11, 1);
        sorter.add(12, 3);
        sorter.add(13, 2);

        let ids: Vec<u64> = sorter.sorted_ids().collect();
        assert_eq!(ids, vec![11, 13, 10, 12]);
    }

    #[test]
    fn pairs_carry_their_values() {
        let mut sorter = BucketSorter::new();
        sorter.add(7, 2);
        sorter.add(8, 0);

        let pairs: Vec<(u64, u64)> = sorter.sorted_pairs().collect();
        assert_eq!(pairs, vec![(8, 0), (7, 2)]);
    }

    #[test]
    fn value_zero_and_far_values_both_land() {
        let mut sorter = BucketSorter::new();
        sorter.add(1, 0);
        sorter.add(2, 5_000_000);

        let ids: Vec<u64> = sorter.sorted_ids().collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(sorter.len(), 2);
    }

    #[test]
    fn traversal_is_non_decreasing() {
        let mut sorter = BucketSorter::new();
        for (id, value) in [(0, 9), (1, 4), (2, 9), (3, 0), (4, 4), (5, 130_000)] {
            sorter.add(id, value);
        }
        let values: Vec<u64> = sorter.sorted_pairs().map(|(_, value)| value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
    }

    #[test]
    fn empty_sorter_yields_nothing() {
        let sorter = BucketSorter::new();
        assert!(sorter.is_empty());
        assert_eq!(sorter.sorted_ids().count(), 0);
    }

    #[test]
    fn preallocation_matches_grown_behavior() {
        let mut sorter = BucketSorter::with_value_capacity(200_000);
        sorter.add(3, 200_000);
        sorter.add(4, 70_000);
        let ids: Vec<u64> = sorter.sorted_ids().collect();
        assert_eq!(ids, vec![4, 3]);
    }
}
