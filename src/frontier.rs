//! Min-priority queue keyed by a real number, values are cell ids.
//!
//! Backed by `std::collections::BinaryHeap` (a max-heap) over `Reverse`,
//! per the Design Note in spec.md §9: "binary heap + visited set; do not
//! attempt decrease-key." Duplicate entries for the same cell with
//! different priorities are permitted -- the caller (the A* loop) is
//! responsible for skipping values already in its visited set when it
//! pops a stale entry.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Total order over `f64` priorities. Priorities in this engine are always
/// finite (sums/products of finite grid distances and risk levels), so a
/// panic on `NaN` comparison would indicate a caller bug rather than a
/// value this type needs to tolerate silently.
#[derive(Copy, Clone, Debug)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or_else(|| panic!("priority queue received a non-comparable priority: {} vs {}", self.0, other.0))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry<T: Eq> {
    priority: Priority,
    value: T,
}

impl<T: Eq> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest priority first.
        other.priority.cmp(&self.priority)
    }
}

/// Duplicate-tolerant min-priority frontier.
pub struct PriorityFrontier<T: Eq> {
    heap: BinaryHeap<Entry<T>>,
}

impl<T: Eq> Default for PriorityFrontier<T> {
    fn default() -> Self {
        PriorityFrontier { heap: BinaryHeap::new() }
    }
}

impl<T: Eq> PriorityFrontier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(log n). Duplicates of `value` with a different `priority` are permitted.
    pub fn insert(&mut self, value: T, priority: f64) {
        self.heap.push(Entry { priority: Priority(priority), value });
    }

    /// Removes and returns the value with least priority. Ties are broken
    /// arbitrarily but deterministically within a single run (insertion
    /// order among equal priorities, as `BinaryHeap` makes no stability
    /// guarantee beyond that determinism).
    pub fn pop_min(&mut self) -> Option<T> {
        self.heap.pop().map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_priority_order() {
        let mut f = PriorityFrontier::new();
        f.insert("c", 3.0);
        f.insert("a", 1.0);
        f.insert("b", 2.0);
        assert_eq!(f.pop_min(), Some("a"));
        assert_eq!(f.pop_min(), Some("b"));
        assert_eq!(f.pop_min(), Some("c"));
        assert_eq!(f.pop_min(), None);
    }

    #[test]
    fn tolerates_duplicate_values() {
        let mut f = PriorityFrontier::new();
        f.insert(5usize, 10.0);
        f.insert(5usize, 1.0);
        assert_eq!(f.len(), 2);
        assert_eq!(f.pop_min(), Some(5));
        assert_eq!(f.pop_min(), Some(5));
    }

    #[test]
    fn len_and_is_empty() {
        let mut f: PriorityFrontier<i32> = PriorityFrontier::new();
        assert!(f.is_empty());
        f.insert(1, 0.5);
        assert_eq!(f.len(), 1);
        assert!(!f.is_empty());
    }
}
