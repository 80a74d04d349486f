use std::fmt::{self, Display};

use crate::models::interval::Ranged;
use crate::models::sample::SampleId;

///
/// One sequenced DNA molecule, reconstructed from a concordant read pair.
///
/// `end` is the last covered base (the larger mate end minus one), so the
/// fragment spans `[start, end)` for overlap purposes.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl Fragment {
    /// Build a fragment, swapping the coordinates if they arrive reversed.
    pub fn new(chr: impl Into<String>, start: u32, end: u32) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Fragment {
            chr: chr.into(),
            start,
            end,
        }
    }
}

impl Ranged for Fragment {
    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> u32 {
        self.start
    }

    fn end(&self) -> u32 {
        self.end
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chr, self.start, self.end)
    }
}

///
/// All fragments recovered from one sample's alignments.
///
#[derive(Debug, Clone)]
pub struct FragmentSet {
    pub sample: SampleId,
    pub fragments: Vec<Fragment>,
}

impl FragmentSet {
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }
}
