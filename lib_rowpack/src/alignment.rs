use std::fmt::{self, Display, Formatter};

use rustc_hash::FxHashMap;

/// The strand a read was mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl Display for Strand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// The relative orientation of a mate pair.
///
/// The declaration order is the display order used when grouping by pair
/// orientation, with [`Unknown`](Self::Unknown) always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairOrientation {
    Rf,
    Fr,
    Ff,
    Rr,
    Unknown,
}

impl PairOrientation {
    pub const ALL: [Self; 5] = [Self::Rf, Self::Fr, Self::Ff, Self::Rr, Self::Unknown];

    /// The canonical name of this orientation category, as used for group keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rf => "RF",
            Self::Fr => "FR",
            Self::Ff => "FF",
            Self::Rr => "RR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// The inverse of [`name`](Self::name), returning `None` for names that are
    /// not orientation categories.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|orientation| orientation.name() == name)
    }
}

impl Display for PairOrientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What an alignment knows about its mate without the mate being materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MateInfo {
    pub chromosome: String,
    pub mapped: bool,
}

/// A single already-parsed read alignment.
///
/// Coordinates are zero-based half-open genomic positions.
/// Readers are expected to hand these in sorted by `start` per interval;
/// approximately sorted input is tolerated, see [`crate::packer`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    pub read_name: String,
    pub chromosome: String,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    pub mapped: bool,
    pub paired: bool,
    pub mate: Option<MateInfo>,
    pub sample: Option<String>,
    pub read_group: Option<String>,
    pub first_of_pair_strand: Option<Strand>,
    pub pair_orientation: Option<PairOrientation>,
    pub attributes: FxHashMap<String, String>,
}

impl Alignment {
    /// Create a mapped, unpaired forward-strand alignment.
    ///
    /// All optional metadata starts out absent; callers fill in the public
    /// fields they need.
    pub fn new(read_name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            read_name: read_name.into(),
            chromosome: String::new(),
            start,
            end,
            strand: Strand::Forward,
            mapped: true,
            paired: false,
            mate: None,
            sample: None,
            read_group: None,
            first_of_pair_strand: None,
            pair_orientation: None,
            attributes: FxHashMap::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One query interval together with its position-sorted alignments.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentInterval {
    pub start: usize,
    pub end: usize,
    pub alignments: Vec<Alignment>,
}

impl AlignmentInterval {
    pub fn new(start: usize, end: usize, alignments: Vec<Alignment>) -> Self {
        debug_assert!(start <= end);
        Self {
            start,
            end,
            alignments,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
