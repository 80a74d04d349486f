//! Per-chromosome interval indexing.
//!
//! [`ChromIndex`] keeps one [`AIList`] per chromosome so a query only ever
//! searches intervals on its own chromosome. Anything implementing
//! [`Ranged`] (fragments, peaks) can be indexed.
//!
//! ```
//! use cutqc_core::models::Peak;
//! use cutqc_overlaprs::chrom_index::IntoChromIndex;
//!
//! let peaks = vec![
//!     Peak::new("chr1", 100, 200, 5.0, 2.0).unwrap(),
//!     Peak::new("chr2", 100, 200, 3.0, 1.0).unwrap(),
//! ];
//! let index = peaks.as_slice().into_chrom_index();
//!
//! let frag = cutqc_core::models::Fragment::new("chr1", 150, 400);
//! assert!(index.any_overlap(&frag));
//! ```

use std::collections::HashMap;

use cutqc_core::models::{Interval, Ranged};

use crate::{AIList, Overlapper};

/// An overlap index over many chromosomes. The payload `T` is usually the
/// position of the interval in the slice it was built from.
pub struct ChromIndex<T>
where
    T: Eq + Clone + Send + Sync,
{
    index_maps: HashMap<String, AIList<u32, T>>,
}

impl<T> ChromIndex<T>
where
    T: Eq + Clone + Send + Sync,
{
    /// Build from `(chromosome, interval)` pairs in any order.
    pub fn build<It>(entries: It) -> Self
    where
        It: IntoIterator<Item = (String, Interval<u32, T>)>,
    {
        let mut grouped: HashMap<String, Vec<Interval<u32, T>>> = HashMap::new();
        for (chr, interval) in entries {
            grouped.entry(chr).or_default().push(interval);
        }

        let index_maps = grouped
            .into_iter()
            .map(|(chr, intervals)| (chr, AIList::build(intervals)))
            .collect();

        ChromIndex { index_maps }
    }

    /// Every stored interval overlapping `query`, in no particular order.
    pub fn find_iter<'a, R: Ranged>(
        &'a self,
        query: &R,
    ) -> Box<dyn Iterator<Item = &'a Interval<u32, T>> + 'a> {
        match self.index_maps.get(query.chr()) {
            Some(list) => list.find_iter(query.start(), query.end()),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn any_overlap<R: Ranged>(&self, query: &R) -> bool {
        self.index_maps
            .get(query.chr())
            .is_some_and(|list| list.any_overlap(query.start(), query.end()))
    }

    pub fn count<R: Ranged>(&self, query: &R) -> usize {
        self.index_maps
            .get(query.chr())
            .map_or(0, |list| list.count(query.start(), query.end()))
    }

    /// Chromosomes that hold at least one interval.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.index_maps.keys().map(|c| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.index_maps.values().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a [`ChromIndex`] whose payload is the element's position in the slice.
pub trait IntoChromIndex {
    fn into_chrom_index(self) -> ChromIndex<usize>;
}

impl<R: Ranged> IntoChromIndex for &[R] {
    fn into_chrom_index(self) -> ChromIndex<usize> {
        ChromIndex::build(self.iter().enumerate().map(|(idx, item)| {
            (
                item.chr().to_string(),
                Interval {
                    start: item.start().min(item.end()),
                    end: item.start().max(item.end()),
                    val: idx,
                },
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cutqc_core::models::{Fragment, Peak};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn peaks() -> Vec<Peak> {
        vec![
            Peak::new("chr1", 100, 200, 1.0, 1.0).unwrap(),
            Peak::new("chr1", 300, 400, 1.0, 1.0).unwrap(),
            Peak::new("chr1", 600, 800, 1.0, 1.0).unwrap(),
            Peak::new("chr2", 100, 200, 1.0, 1.0).unwrap(),
        ]
    }

    #[rstest]
    #[case(Fragment::new("chr1", 110, 210), 1)]
    #[case(Fragment::new("chr1", 150, 650), 3)]
    #[case(Fragment::new("chr1", 200, 300), 0)]
    #[case(Fragment::new("chr2", 0, 101), 1)]
    #[case(Fragment::new("chrX", 100, 200), 0)]
    fn test_count(peaks: Vec<Peak>, #[case] frag: Fragment, #[case] expected: usize) {
        let index = peaks.as_slice().into_chrom_index();
        assert_eq!(index.count(&frag), expected);
        assert_eq!(index.any_overlap(&frag), expected > 0);
    }

    #[rstest]
    fn test_payload_is_slice_position(peaks: Vec<Peak>) {
        let index = peaks.as_slice().into_chrom_index();
        let hits: Vec<usize> = index
            .find_iter(&Fragment::new("chr2", 150, 160))
            .map(|iv| iv.val)
            .collect();
        assert_eq!(hits, vec![3]);
        assert_eq!(index.len(), 4);
    }

    #[rstest]
    fn test_chromosomes(peaks: Vec<Peak>) {
        let index = peaks.as_slice().into_chrom_index();
        let mut chroms: Vec<&str> = index.chromosomes().collect();
        chroms.sort();
        assert_eq!(chroms, vec!["chr1", "chr2"]);
    }
}
