/// The attribute by which alignments are partitioned into groups.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupBy {
    /// The strand the alignment was mapped to.
    Strand,
    /// The sample the alignment belongs to.
    Sample,
    /// The alignment's read group.
    ReadGroup,
    /// The value of the given optional alignment attribute.
    Tag(String),
    /// The strand of the first-of-pair mate.
    FirstOfPairStrand,
    /// The relative orientation category of the mate pair.
    PairOrientation,
    /// The chromosome the mate was mapped to.
    MateChromosome,
}

/// Configuration for one packing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackOptions {
    /// Partition alignments into independently packed groups, or pack
    /// everything into the single default group if `None`.
    pub group_by: Option<GroupBy>,
    /// Link mapped mate pairs into single packable units.
    pub view_pairs: bool,
    /// Pair linkage is also required by the arc view of mate pairs.
    pub paired_arc_view: bool,
}

impl PackOptions {
    /// Whether mate pairs are linked into single units before packing.
    pub fn pair_alignments(&self) -> bool {
        self.view_pairs || self.paired_arc_view
    }
}
