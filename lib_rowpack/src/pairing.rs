use rustc_hash::FxHashMap;

use crate::alignment::Alignment;


/// Two mapped mate alignments of one read, merged into a single packable span.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatePair {
    pub first: Alignment,
    pub second: Alignment,
}

impl MatePair {
    pub fn start(&self) -> usize {
        self.first.start.min(self.second.start)
    }

    pub fn end(&self) -> usize {
        self.first.end.max(self.second.end)
    }
}

/// The unit the packer places into rows: a single alignment, or a linked mate
/// pair spanning the combined extent of both mates.
///
/// Units are created once during pair linkage and never mutated afterwards;
/// the row builder consumes each unit exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackableUnit {
    Single(Alignment),
    Pair(MatePair),
}

impl PackableUnit {
    pub fn start(&self) -> usize {
        match self {
            Self::Single(alignment) => alignment.start,
            Self::Pair(pair) => pair.start(),
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Self::Single(alignment) => alignment.end,
            Self::Pair(pair) => pair.end(),
        }
    }

    /// The genomic length of this unit, for a pair including the gap between
    /// the mates.
    pub fn span(&self) -> usize {
        self.end() - self.start()
    }

    pub fn read_name(&self) -> &str {
        match self {
            Self::Single(alignment) => &alignment.read_name,
            Self::Pair(pair) => &pair.first.read_name,
        }
    }

    /// The number of source alignments covered by this unit.
    pub fn alignment_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Pair(_) => 2,
        }
    }
}

/// Turn per-range alignment sequences into per-range packable units.
///
/// Unmapped alignments never enter the packing universe. With pair linkage
/// enabled, the first mapped mate of a read becomes a pending single unit in
/// its original position; the second mapped mate merges both into a
/// [`PackableUnit::Pair`] occupying the first mate's slot, which may lie in an
/// earlier range. Reads seen a third time start a new pending entry, so
/// supernumerary alignments of one read pair up two at a time.
pub(crate) fn link_units(
    per_range_alignments: Vec<Vec<Alignment>>,
    pair_alignments: bool,
) -> Vec<Vec<PackableUnit>> {
    let mut slots: Vec<Vec<Option<PackableUnit>>> = Vec::with_capacity(per_range_alignments.len());
    let mut pending: FxHashMap<String, (usize, usize)> = FxHashMap::default();

    for (range_index, alignments) in per_range_alignments.into_iter().enumerate() {
        let mut range_slots = Vec::with_capacity(alignments.len());

        for alignment in alignments {
            if !alignment.mapped {
                continue;
            }

            let linkable = pair_alignments
                && alignment.paired
                && alignment.mate.as_ref().is_some_and(|mate| mate.mapped);
            if !linkable {
                range_slots.push(Some(PackableUnit::Single(alignment)));
                continue;
            }

            if let Some((first_range, first_slot)) = pending.remove(&alignment.read_name) {
                let slot = if first_range == range_index {
                    &mut range_slots[first_slot]
                } else {
                    &mut slots[first_range][first_slot]
                };
                if let Some(PackableUnit::Single(first)) = slot.take() {
                    *slot = Some(PackableUnit::Pair(MatePair {
                        first,
                        second: alignment,
                    }));
                }
            } else {
                pending.insert(
                    alignment.read_name.clone(),
                    (range_index, range_slots.len()),
                );
                range_slots.push(Some(PackableUnit::Single(alignment)));
            }
        }

        slots.push(range_slots);
    }

    slots
        .into_iter()
        .map(|range_slots| range_slots.into_iter().flatten().collect())
        .collect()
}
