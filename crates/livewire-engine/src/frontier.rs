//! Min-priority queue over grid cells, keyed by tentative total cost.
//!
//! Dijkstra's decrease-key operation is replaced by reinsertion with
//! lazy deletion: a cell may be pushed several times with different
//! priorities, and the search loop discards entries whose cell is
//! already settled. The queue itself never deduplicates.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::CellIndex;

/// One queued cell with its tentative priority.
///
/// Ordered by priority, then by insertion sequence so that equal
/// priorities pop in FIFO order. `f64::total_cmp` gives the total
/// order `BinaryHeap` requires even though priorities are floats.
#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f64,
    seq: u64,
    cell: CellIndex,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-priority queue of discovered-but-not-settled cells.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl PriorityFrontier {
    /// Create an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cell at the given priority.
    ///
    /// The same cell may be queued any number of times; stale entries
    /// are the caller's responsibility to discard after popping.
    pub fn push(&mut self, cell: CellIndex, priority: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            priority,
            seq,
            cell,
        }));
    }

    /// Remove and return the lowest-priority cell, if any.
    pub fn pop_min(&mut self) -> Option<CellIndex> {
        self.heap.pop().map(|Reverse(entry)| entry.cell)
    }

    /// Priority of the lowest-priority entry without removing it.
    #[must_use]
    pub fn peek_min_priority(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.priority)
    }

    /// Returns `true` if no entries are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
