use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::models::peak::Peak;
use crate::models::sample::{SampleId, natural_cmp};

///
/// Called peaks for every sample, keyed by group/replicate identity.
///
/// Backed by a [BTreeMap] so iteration order is stable from run to run.
///
/// Samples whose peak file could not be used are kept apart with the reason.
/// They still name a group and a replicate, so they take part in
/// [PeakSet::groups] and [PeakSet::replicates] but never in the peak lookups.
#[derive(Debug, Clone, Default)]
pub struct PeakSet {
    sets: BTreeMap<SampleId, Vec<Peak>>,
    failed: BTreeMap<SampleId, String>,
}

impl PeakSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the peaks for one sample, returning whatever was there before.
    pub fn insert(&mut self, sample: SampleId, peaks: Vec<Peak>) -> Option<Vec<Peak>> {
        self.failed.remove(&sample);
        self.sets.insert(sample, peaks)
    }

    /// Record that the peaks for `sample` could not be loaded.
    pub fn mark_failed(&mut self, sample: SampleId, reason: impl Into<String>) {
        self.sets.remove(&sample);
        self.failed.insert(sample, reason.into());
    }

    /// Why the peaks for `sample` are unusable, if they are.
    pub fn failure(&self, sample: &SampleId) -> Option<&str> {
        self.failed.get(sample).map(|r| r.as_str())
    }

    pub fn failures(&self) -> btree_map::Iter<'_, SampleId, String> {
        self.failed.iter()
    }

    fn identities(&self) -> impl Iterator<Item = &SampleId> {
        self.sets.keys().chain(self.failed.keys())
    }

    pub fn get(&self, sample: &SampleId) -> Option<&[Peak]> {
        self.sets.get(sample).map(|p| p.as_slice())
    }

    ///
    /// Peaks for a group/replicate pair. Unknown pairs yield an empty slice.
    pub fn peaks_for(&self, group: &str, replicate: &str) -> &[Peak] {
        self.get(&SampleId::new(group, replicate)).unwrap_or(&[])
    }

    /// Distinct groups, naturally ordered.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.identities().map(|id| id.group.as_str()).collect();
        groups.sort_by(|a, b| natural_cmp(a, b));
        groups.dedup();
        groups
    }

    ///
    /// Distinct replicate labels seen in *any* group, naturally ordered.
    pub fn replicates(&self) -> Vec<&str> {
        let mut reps: Vec<&str> = self.identities().map(|id| id.replicate.as_str()).collect();
        reps.sort_by(|a, b| natural_cmp(a, b));
        reps.dedup();
        reps
    }

    pub fn replicate_count(&self) -> usize {
        self.replicates().len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, SampleId, Vec<Peak>> {
        self.sets.iter()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FromIterator<(SampleId, Vec<Peak>)> for PeakSet {
    fn from_iter<T: IntoIterator<Item = (SampleId, Vec<Peak>)>>(iter: T) -> Self {
        PeakSet {
            sets: iter.into_iter().collect(),
            failed: BTreeMap::new(),
        }
    }
}

impl<'a> IntoIterator for &'a PeakSet {
    type Item = (&'a SampleId, &'a Vec<Peak>);
    type IntoIter = btree_map::Iter<'a, SampleId, Vec<Peak>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}
