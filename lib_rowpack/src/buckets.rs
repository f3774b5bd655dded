use std::cmp::Ordering;

use binary_heap_plus::{BinaryHeap, MaxComparator};
use itertools::Itertools;
use log::error;
use rustc_hash::FxHashMap;

use crate::pairing::PackableUnit;


/// Spans below this many addressable buckets use the dense storage strategy.
pub const DENSE_SPAN_LIMIT: usize = 10_000_000;

/// How buckets are stored during one packing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BucketStrategy {
    /// Fixed array indexed by offset. Assumes all or nearly all of the span
    /// is covered with reads.
    Dense,
    /// Hash map plus a sorted occupied-offset index. Assumes small clusters
    /// of reads separated by mostly empty span.
    Sparse,
}

impl BucketStrategy {
    pub(crate) fn for_span(span: usize) -> Self {
        if span < DENSE_SPAN_LIMIT {
            Self::Dense
        } else {
            Self::Sparse
        }
    }
}

#[derive(Debug)]
struct BucketEntry {
    unit: PackableUnit,
    span: usize,
    sequence: u64,
}

impl Ord for BucketEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Longest span first; equal spans pop in insertion order.
        self.span
            .cmp(&other.span)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for BucketEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BucketEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BucketEntry {}

/// The units competing to start at one relative offset, longest first.
#[derive(Debug)]
pub(crate) struct Bucket {
    heap: BinaryHeap<BucketEntry, MaxComparator>,
    next_sequence: u64,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl Bucket {
    pub(crate) fn push(&mut self, unit: PackableUnit) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(BucketEntry {
            span: unit.span(),
            unit,
            sequence,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<PackableUnit> {
        self.heap.pop().map(|entry| entry.unit)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Offset-indexed bucket storage for one packing pass.
///
/// Both variants expose the same capability set; the packer picks a variant
/// once per pass via [`BucketStrategy::for_span`] and never mixes them.
#[derive(Debug)]
pub(crate) enum BucketCollection {
    Dense(DenseBuckets),
    Sparse(SparseBuckets),
}

impl BucketCollection {
    pub(crate) fn new(strategy: BucketStrategy, span: usize) -> Self {
        match strategy {
            BucketStrategy::Dense => Self::Dense(DenseBuckets::new(span)),
            BucketStrategy::Sparse => Self::Sparse(SparseBuckets::default()),
        }
    }

    pub(crate) fn insert(&mut self, offset: usize, unit: PackableUnit) {
        match self {
            Self::Dense(dense) => dense.insert(offset, unit),
            Self::Sparse(sparse) => sparse.insert(offset, unit),
        }
    }

    /// The nearest occupied offset at or after `offset`, or `None` if the
    /// rest of the span is empty.
    ///
    /// Buckets found empty along the way are discarded immediately by the
    /// dense variant and flagged into `empty_offsets` for later batch removal
    /// by the sparse variant.
    pub(crate) fn next_occupied(
        &mut self,
        offset: usize,
        empty_offsets: &mut Vec<usize>,
    ) -> Option<usize> {
        match self {
            Self::Dense(dense) => dense.next_occupied(offset),
            Self::Sparse(sparse) => sparse.next_occupied(offset, empty_offsets),
        }
    }

    pub(crate) fn pop(&mut self, offset: usize) -> Option<PackableUnit> {
        match self {
            Self::Dense(dense) => dense.pop(offset),
            Self::Sparse(sparse) => sparse.pop(offset),
        }
    }

    /// Batch-removal checkpoint for the offsets flagged by
    /// [`next_occupied`](Self::next_occupied).
    pub(crate) fn remove_buckets(&mut self, empty_offsets: &[usize]) {
        if let Self::Sparse(sparse) = self {
            sparse.remove_buckets(empty_offsets);
        }
    }

    /// Must be called once all units are inserted and before the first
    /// [`next_occupied`](Self::next_occupied) query.
    pub(crate) fn finished_adding(&mut self) {
        if let Self::Sparse(sparse) = self {
            sparse.finished_adding();
        }
    }
}

/// Dense array storage. Slots are boxed so an unoccupied slot costs one word.
#[derive(Debug)]
pub(crate) struct DenseBuckets {
    slots: Vec<Option<Box<Bucket>>>,
}

impl DenseBuckets {
    fn new(span: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(span, || None);
        Self { slots }
    }

    fn insert(&mut self, offset: usize, unit: PackableUnit) {
        self.slots[offset]
            .get_or_insert_with(Box::default)
            .push(unit);
    }

    fn next_occupied(&mut self, offset: usize) -> Option<usize> {
        for index in offset..self.slots.len() {
            if let Some(bucket) = &self.slots[index] {
                if bucket.is_empty() {
                    self.slots[index] = None;
                } else {
                    return Some(index);
                }
            }
        }
        None
    }

    fn pop(&mut self, offset: usize) -> Option<PackableUnit> {
        self.slots[offset].as_mut().and_then(|bucket| bucket.pop())
    }
}

/// Sparse hash storage with a sorted occupied-offset index.
///
/// The index is rebuilt only at [`finished_adding`](Self::finished_adding)
/// and batch-removal checkpoints, so forward scans can binary-search instead
/// of probing every offset.
#[derive(Debug, Default)]
pub(crate) struct SparseBuckets {
    buckets: FxHashMap<usize, Bucket>,
    occupied_offsets: Vec<usize>,
    finished: bool,
}

impl SparseBuckets {
    fn insert(&mut self, offset: usize, unit: PackableUnit) {
        if self.finished {
            error!("Bucket inserted at offset {offset} after finished_adding()");
        }
        self.buckets.entry(offset).or_default().push(unit);
    }

    fn next_occupied(&mut self, offset: usize, empty_offsets: &mut Vec<usize>) -> Option<usize> {
        let first_candidate = self.occupied_offsets.partition_point(|&key| key < offset);
        for &key in &self.occupied_offsets[first_candidate..] {
            if self.buckets[&key].is_empty() {
                empty_offsets.push(key);
            } else {
                return Some(key);
            }
        }
        None
    }

    fn pop(&mut self, offset: usize) -> Option<PackableUnit> {
        self.buckets.get_mut(&offset).and_then(|bucket| bucket.pop())
    }

    fn remove_buckets(&mut self, empty_offsets: &[usize]) {
        if empty_offsets.is_empty() {
            return;
        }

        for offset in empty_offsets {
            self.buckets.remove(offset);
        }
        self.rebuild_index();
    }

    fn finished_adding(&mut self) {
        self.finished = true;
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.occupied_offsets = self.buckets.keys().copied().sorted_unstable().collect();
    }
}
