use std::collections::BTreeMap;

use serde::Serialize;

use cutqc_core::models::{Fragment, FragmentSet, Ranged};
use cutqc_io::FragmentSizeFile;

use crate::tables::QcTable;

/// How often each fragment length occurs in one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentLengthRecord {
    pub group: String,
    pub replicate: String,
    pub length: u32,
    pub occurrences: u64,
}

/// One row of a precomputed fragment size histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentSizeRecord {
    pub group: String,
    pub replicate: String,
    pub size: u32,
    pub occurrences: u64,
}

/// A single fragment size observation from [expand_sizes].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FragmentSizeObservation<'a> {
    pub group: &'a str,
    pub replicate: &'a str,
    pub fragment_size: u32,
}

///
/// Count fragments by absolute width, shortest first.
pub fn fragment_length_histogram(fragments: &[Fragment]) -> Vec<(u32, u64)> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for fragment in fragments {
        *counts.entry(fragment.width()).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Length histograms for every loaded sample, in the order given.
pub fn fragment_length_table(sets: &[FragmentSet]) -> QcTable<FragmentLengthRecord> {
    sets.iter()
        .flat_map(|set| {
            fragment_length_histogram(&set.fragments)
                .into_iter()
                .map(move |(length, occurrences)| FragmentLengthRecord {
                    group: set.sample.group.clone(),
                    replicate: set.sample.replicate.clone(),
                    length,
                    occurrences,
                })
        })
        .collect()
}

/// Tag every precomputed histogram row with its sample's group and replicate.
pub fn fragment_size_table(files: &[FragmentSizeFile]) -> QcTable<FragmentSizeRecord> {
    files
        .iter()
        .flat_map(|file| {
            file.sizes.iter().map(move |&(size, occurrences)| FragmentSizeRecord {
                group: file.sample.group.clone(),
                replicate: file.sample.replicate.clone(),
                size,
                occurrences,
            })
        })
        .collect()
}

///
/// Long form of a size histogram: each size repeated `occurrences` times.
///
/// Lazy, since a deeply sequenced sample expands to millions of rows.
pub fn expand_sizes(
    records: &[FragmentSizeRecord],
) -> impl Iterator<Item = FragmentSizeObservation<'_>> {
    records.iter().flat_map(|record| {
        std::iter::repeat_n(
            FragmentSizeObservation {
                group: &record.group,
                replicate: &record.replicate,
                fragment_size: record.size,
            },
            record.occurrences as usize,
        )
    })
}
