///
/// Fragment count inside one fixed-width genomic bin.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinnedCount {
    pub chr: String,
    pub bin: u64,
    pub count: u64,
}

///
/// Every bin reported for one sample.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BinnedCounts {
    pub sample: String,
    pub counts: Vec<BinnedCount>,
}

impl BinnedCounts {
    pub fn new(sample: impl Into<String>) -> Self {
        BinnedCounts {
            sample: sample.into(),
            counts: Vec::new(),
        }
    }

    pub fn push(&mut self, chr: impl Into<String>, bin: u64, count: u64) {
        self.counts.push(BinnedCount {
            chr: chr.into(),
            bin,
            count,
        });
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
