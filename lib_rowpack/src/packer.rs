use std::time::Instant;

use log::debug;
use rustc_hash::FxHashMap;

use crate::{
    alignment::{Alignment, AlignmentInterval},
    buckets::{BucketCollection, BucketStrategy},
    error::{Error, Result},
    grouping::{GroupKey, classify, compare_group_keys},
    options::PackOptions,
    pairing::{PackableUnit, link_units},
};

#[cfg(test)]
mod tests;

/// Minimum gap between the end of one unit and the start of the next within
/// a row.
pub const MIN_ALIGNMENT_SPACING: usize = 5;

/// One horizontal display lane of non-overlapping units in left-to-right
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    units: Vec<PackableUnit>,
    last_end: usize,
}

impl Row {
    fn push(&mut self, unit: PackableUnit) {
        self.last_end = unit.end();
        self.units.push(unit);
    }

    pub fn units(&self) -> &[PackableUnit] {
        &self.units
    }

    /// The end coordinate of the last placed unit, used for spacing checks.
    pub fn last_end(&self) -> usize {
        self.last_end
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// The rows of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedGroup {
    /// The display name of the group. Empty for the default group, which is
    /// always present and always last.
    pub name: String,
    pub rows: Vec<Row>,
}

/// The result of one packing pass: an ordered mapping from group display
/// name to rows, plus the out-of-bounds drop count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedAlignments {
    pub groups: Vec<PackedGroup>,
    /// The number of units whose computed bucket offset fell outside the
    /// addressable span. Their identities are reported at debug level.
    pub dropped: usize,
}

impl PackedAlignments {
    pub fn rows_for(&self, name: &str) -> Option<&[Row]> {
        self.groups
            .iter()
            .find(|group| group.name == name)
            .map(|group| group.rows.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|group| group.rows.len()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct QueryRange {
    start: usize,
    end: usize,
}

impl QueryRange {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Pack the alignments of the given query intervals into non-overlapping
/// rows, one independent row sequence per group.
///
/// The interval order determines the packing order; each interval's
/// alignments must be sorted by start position. Fails before any allocation
/// if `intervals` is empty, since at least one interval is required to
/// establish the addressable span. Units falling outside the addressable
/// span are dropped and counted, never fatal.
pub fn pack_alignments(
    intervals: Vec<AlignmentInterval>,
    options: &PackOptions,
) -> Result<PackedAlignments> {
    if intervals.is_empty() {
        return Err(Error::EmptyIntervalList);
    }

    let start_time = Instant::now();
    let ranges: Vec<_> = intervals
        .iter()
        .map(|interval| QueryRange {
            start: interval.start,
            end: interval.end,
        })
        .collect();
    let span: usize = ranges.iter().map(QueryRange::len).sum();
    let strategy = BucketStrategy::for_span(span);
    let pair_alignments = options.pair_alignments();

    let mut groups = Vec::new();
    let mut dropped = 0;

    if options.group_by.is_none() {
        let per_range = intervals
            .into_iter()
            .map(|interval| interval.alignments)
            .collect();
        let units = link_units(per_range, pair_alignments);
        let rows = pack_group(units, &ranges, strategy, &mut dropped);
        groups.push(PackedGroup {
            name: String::new(),
            rows,
        });
    } else {
        // Build the group -> range -> alignments table up front; it is not
        // touched again once packing starts.
        let range_count = ranges.len();
        let mut table: FxHashMap<GroupKey, Vec<Vec<Alignment>>> = FxHashMap::default();
        for (range_index, interval) in intervals.into_iter().enumerate() {
            for alignment in interval.alignments {
                let key = classify(&alignment, options);
                table
                    .entry(key)
                    .or_insert_with(|| vec![Vec::new(); range_count])[range_index]
                    .push(alignment);
            }
        }

        let mut keys: Vec<_> = table
            .keys()
            .filter(|key| **key != GroupKey::Missing)
            .cloned()
            .collect();
        keys.sort_by(|a, b| compare_group_keys(options.group_by.as_ref(), a, b));

        for key in keys {
            let per_range = table.remove(&key).unwrap_or_default();
            let units = link_units(per_range, pair_alignments);
            let rows = pack_group(units, &ranges, strategy, &mut dropped);
            groups.push(PackedGroup {
                name: key.display_name().to_owned(),
                rows,
            });
        }

        // The group of alignments without a group value comes last, under
        // the empty display name, even if it holds nothing.
        let per_range = table.remove(&GroupKey::Missing).unwrap_or_default();
        let units = link_units(per_range, pair_alignments);
        let rows = pack_group(units, &ranges, strategy, &mut dropped);
        groups.push(PackedGroup {
            name: String::new(),
            rows,
        });
    }

    debug!(
        "Packed alignments into {} rows in {:?}",
        groups.iter().map(|group| group.rows.len()).sum::<usize>(),
        start_time.elapsed()
    );
    Ok(PackedAlignments { groups, dropped })
}

/// Pack one group's units into rows using the given storage strategy.
fn pack_group(
    units: Vec<Vec<PackableUnit>>,
    ranges: &[QueryRange],
    strategy: BucketStrategy,
    dropped: &mut usize,
) -> Vec<Row> {
    let (buckets, total) = allocate(units, ranges, strategy, dropped);
    RowBuilder::new(ranges, buckets, total).build()
}

/// Insert every unit into its bucket.
///
/// The bucket offset is the unit's start relative to its range's start,
/// shifted by the combined length of all preceding ranges. Starts before the
/// range start clamp into the range's first bucket, since input is only
/// approximately sorted when reads are soft-clipped.
fn allocate(
    units: Vec<Vec<PackableUnit>>,
    ranges: &[QueryRange],
    strategy: BucketStrategy,
    dropped: &mut usize,
) -> (BucketCollection, usize) {
    let span: usize = ranges.iter().map(QueryRange::len).sum();
    let mut buckets = BucketCollection::new(strategy, span);
    let mut base_offset = 0;
    let mut total = 0;

    for (range, range_units) in ranges.iter().zip(units) {
        for unit in range_units {
            let offset = unit.start().saturating_sub(range.start) + base_offset;
            if offset < span {
                buckets.insert(offset, unit);
                total += 1;
            } else {
                debug!(
                    "Dropping unit {} at {}: bucket offset {offset} is beyond the addressable span {span}",
                    unit.read_name(),
                    unit.start(),
                );
                *dropped += 1;
            }
        }
        base_offset += range.len();
    }

    buckets.finished_adding();
    (buckets, total)
}

/// Greedily drains a bucket collection into rows.
///
/// Each pass scans the ranges front to back, repeatedly pulling the
/// highest-priority unit from the nearest occupied bucket that respects the
/// spacing constraint, until no further unit fits; the pass then emits the
/// row and the next pass starts over from the front. Every pass places at
/// least one unit while any remain, so this terminates.
struct RowBuilder<'ranges> {
    ranges: &'ranges [QueryRange],
    buckets: BucketCollection,
    remaining: usize,
}

impl<'ranges> RowBuilder<'ranges> {
    fn new(ranges: &'ranges [QueryRange], buckets: BucketCollection, total: usize) -> Self {
        Self {
            ranges,
            buckets,
            remaining: total,
        }
    }

    fn build(mut self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut empty_offsets = Vec::new();

        while self.remaining > 0 {
            let row = self.build_row(&mut empty_offsets);
            if !row.is_empty() {
                rows.push(row);
            }

            // Batch-removal checkpoint for buckets found empty during the
            // pass. Only the sparse storage needs this, the dense storage
            // discards empty buckets on the fly.
            self.buckets.remove_buckets(&empty_offsets);
            empty_offsets.clear();
        }

        rows
    }

    fn build_row(&mut self, empty_offsets: &mut Vec<usize>) -> Row {
        let mut row = Row::default();
        let mut range_index = 0;
        let mut base_offset = 0;
        let mut next_allowed_start = self.ranges[0].start;

        'scan: loop {
            let range = self.ranges[range_index];
            let offset = next_allowed_start.saturating_sub(range.start) + base_offset;

            let unit = match self
                .buckets
                .next_occupied(offset, empty_offsets)
                .and_then(|found| self.buckets.pop(found))
            {
                Some(unit) => unit,
                None => break 'scan,
            };

            next_allowed_start = unit.end() + MIN_ALIGNMENT_SPACING;
            row.push(unit);
            self.remaining -= 1;

            // When the allowed start passes the current range, carry the base
            // offset forward over every consumed range. Exhausting the ranges
            // ends the row.
            while next_allowed_start >= self.ranges[range_index].end {
                base_offset += self.ranges[range_index].len();
                range_index += 1;
                if range_index == self.ranges.len() {
                    break 'scan;
                }
            }
        }

        row
    }
}
