use std::cmp::Ordering;

use crate::{
    alignment::{Alignment, PairOrientation},
    options::{GroupBy, PackOptions},
};


/// A group key produced by [`classify`].
///
/// Absent attribute values become [`Missing`](Self::Missing) instead of
/// propagating raw into hashing or ordering, so group storage never needs to
/// special-case an absent key. The missing group always sorts last and is
/// displayed with an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Value(String),
    Missing,
}

impl GroupKey {
    fn from_option(value: Option<String>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Missing,
        }
    }

    /// The name shown to the consumer of the packed result.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Value(value) => value,
            Self::Missing => "",
        }
    }
}

/// Map an alignment to its group key under the configured grouping mode.
///
/// Deterministic and side-effect-free. Returns [`GroupKey::Missing`] if no
/// grouping mode is configured or the grouped-by attribute is absent, except
/// for pair orientation where an absent orientation maps to the real
/// `UNKNOWN` category.
pub fn classify(alignment: &Alignment, options: &PackOptions) -> GroupKey {
    let Some(group_by) = &options.group_by else {
        return GroupKey::Missing;
    };

    match group_by {
        GroupBy::Strand => GroupKey::Value(alignment.strand.to_string()),
        GroupBy::Sample => GroupKey::from_option(alignment.sample.clone()),
        GroupBy::ReadGroup => GroupKey::from_option(alignment.read_group.clone()),
        GroupBy::Tag(tag) => {
            GroupKey::from_option(alignment.attribute(tag).map(ToOwned::to_owned))
        }
        GroupBy::FirstOfPairStrand => GroupKey::from_option(
            alignment
                .first_of_pair_strand
                .map(|strand| strand.to_string()),
        ),
        GroupBy::PairOrientation => GroupKey::Value(
            alignment
                .pair_orientation
                .unwrap_or(PairOrientation::Unknown)
                .name()
                .to_owned(),
        ),
        GroupBy::MateChromosome => GroupKey::from_option(
            alignment
                .mate
                .as_ref()
                .map(|mate| mate.chromosome.clone()),
        ),
    }
}

/// Compare two group keys for the final output ordering.
///
/// Stateless. With pair-orientation grouping the keys are ordered by the
/// fixed [`PairOrientation`] category sequence, names that are no category
/// sorting last. All other modes order case-insensitively lexicographic.
/// [`GroupKey::Missing`] sorts after every real key in every mode.
pub fn compare_group_keys(group_by: Option<&GroupBy>, a: &GroupKey, b: &GroupKey) -> Ordering {
    match (a, b) {
        (GroupKey::Missing, GroupKey::Missing) => Ordering::Equal,
        (GroupKey::Missing, GroupKey::Value(_)) => Ordering::Greater,
        (GroupKey::Value(_), GroupKey::Missing) => Ordering::Less,
        (GroupKey::Value(a), GroupKey::Value(b)) => match group_by {
            Some(GroupBy::PairOrientation) => orientation_rank(a).cmp(&orientation_rank(b)),
            _ => a.to_lowercase().cmp(&b.to_lowercase()),
        },
    }
}

fn orientation_rank(name: &str) -> usize {
    PairOrientation::from_name(name)
        .map(|orientation| orientation as usize)
        .unwrap_or(PairOrientation::ALL.len())
}
