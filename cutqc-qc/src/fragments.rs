//! Paired-end fragment reconstruction.
//!
//! Mates are paired by read name in a single pass. A record waits in a
//! pending map until its mate shows up, so the input does not need to be
//! name sorted.

use std::path::Path;

use fxhash::FxHashMap;
use log::{info, warn};
use serde::Serialize;

use cutqc_core::errors::{QcError, Result};
use cutqc_core::models::{AlignmentRecord, Fragment, FragmentSet, SampleId};
use cutqc_io::{AlignmentError, open_alignments};

/// What happened to every record of one sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Records decoded successfully.
    pub records: u64,
    /// Unpaired, unmapped, mate-unmapped, duplicate, secondary or supplementary.
    pub filtered: u64,
    /// Records that could not be decoded.
    pub malformed: u64,
    pub fragments: u64,
    /// Mates still waiting for a partner at end of stream.
    pub unmatched: u64,
    /// Pairs whose mates sit on different chromosomes.
    pub discordant: u64,
}

///
/// Join two mates into the fragment they bound.
///
/// The fragment runs from the leftmost mate start to the rightmost mate end,
/// minus one. Mates on different chromosomes give `None`.
fn pair_mates(mate: &AlignmentRecord, other: &AlignmentRecord) -> Option<Fragment> {
    let (chr, other_chr) = (mate.chr.as_deref()?, other.chr.as_deref()?);
    if chr != other_chr {
        return None;
    }

    let start = mate.start?.min(other.start?);
    let end = mate.end?.max(other.end?).saturating_sub(1);

    Some(Fragment::new(other_chr, start, end))
}

///
/// Rebuild fragments from one sample's alignment records.
///
/// A fragment is emitted only once both a first-segment and a last-segment
/// record with the same name have been seen. Records that can never
/// contribute to a fragment are counted and dropped. Undecodable records are
/// skipped, an io failure aborts the sample.
///
/// # Arguments
/// - sample: identity the fragments belong to
/// - records: alignment records in file order
pub fn load_fragments<I>(sample: SampleId, records: I) -> Result<(FragmentSet, LoadStats)>
where
    I: IntoIterator<Item = std::result::Result<AlignmentRecord, AlignmentError>>,
{
    let mut stats = LoadStats::default();
    let mut pending: FxHashMap<Vec<u8>, AlignmentRecord> = FxHashMap::default();
    let mut fragments = Vec::new();

    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(AlignmentError::Malformed(reason)) => {
                warn!("{sample}: skipping malformed alignment record: {reason}");
                stats.malformed += 1;
                continue;
            }
            Err(AlignmentError::Io(e)) => return Err(QcError::Io(e)),
        };
        stats.records += 1;

        // a mate has to be exactly one of first or last segment
        if !record.is_usable() || record.is_first_segment() == record.is_last_segment() {
            stats.filtered += 1;
            continue;
        }

        match pending.remove(&record.name) {
            Some(mate) if mate.is_first_segment() != record.is_first_segment() => {
                match pair_mates(&mate, &record) {
                    Some(fragment) => fragments.push(fragment),
                    None => stats.discordant += 1,
                }
            }
            Some(_stale) => {
                // same segment seen twice, the newer record wins
                stats.unmatched += 1;
                pending.insert(record.name.clone(), record);
            }
            None => {
                pending.insert(record.name.clone(), record);
            }
        }
    }

    stats.unmatched += pending.len() as u64;
    stats.fragments = fragments.len() as u64;

    info!(
        "{sample}: {} fragments from {} records \
         ({} filtered, {} malformed, {} unmatched, {} discordant)",
        stats.fragments,
        stats.records,
        stats.filtered,
        stats.malformed,
        stats.unmatched,
        stats.discordant
    );

    Ok((FragmentSet { sample, fragments }, stats))
}

///
/// Open an alignment file and rebuild its fragments. The identity comes from the file name.
pub fn load_sample(path: &Path) -> Result<(FragmentSet, LoadStats)> {
    let sample = SampleId::from_path(path)?;
    let records = open_alignments(path)?;
    load_fragments(sample, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use cutqc_core::models::Ranged;
    use cutqc_core::models::alignment::{
        DUPLICATE, FIRST_SEGMENT, LAST_SEGMENT, MATE_UNMAPPED, PAIRED,
    };
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    type Rec = std::result::Result<AlignmentRecord, AlignmentError>;

    fn rec(name: &str, flags: u16, chr: &str, start: u32, end: u32) -> Rec {
        Ok(AlignmentRecord {
            name: name.as_bytes().to_vec(),
            flags,
            chr: Some(chr.to_string()),
            start: Some(start),
            end: Some(end),
        })
    }

    const R1: u16 = PAIRED | FIRST_SEGMENT;
    const R2: u16 = PAIRED | LAST_SEGMENT;

    #[fixture]
    fn sample() -> SampleId {
        SampleId::new("h3k27me3", "R1")
    }

    #[rstest]
    fn test_pairs_name_sorted_input(sample: SampleId) {
        let records = vec![
            rec("a", R1, "chr1", 100, 150),
            rec("a", R2, "chr1", 300, 350),
            rec("b", R1, "chr2", 500, 550),
            rec("b", R2, "chr2", 450, 500),
        ];
        let (set, stats) = load_fragments(sample, records).unwrap();

        assert_eq!(
            set.fragments,
            vec![Fragment::new("chr1", 100, 349), Fragment::new("chr2", 450, 549)]
        );
        assert_eq!(stats.fragments, 2);
        assert_eq!(stats.unmatched, 0);
    }

    #[rstest]
    fn test_pairs_coordinate_sorted_input(sample: SampleId) {
        let records = vec![
            rec("a", R1, "chr1", 100, 150),
            rec("b", R2, "chr1", 120, 170),
            rec("b", R1, "chr1", 200, 250),
            rec("a", R2, "chr1", 300, 350),
        ];
        let (set, _) = load_fragments(sample, records).unwrap();
        assert_eq!(
            set.fragments,
            vec![Fragment::new("chr1", 120, 249), Fragment::new("chr1", 100, 349)]
        );
    }

    #[rstest]
    fn test_dangling_mate_gives_no_fragment(sample: SampleId) {
        let records = vec![
            rec("a", R1, "chr1", 100, 150),
            rec("a", R2, "chr1", 300, 350),
            rec("orphan", R2, "chr1", 900, 950),
        ];
        let (set, stats) = load_fragments(sample, records).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.records, 3);
    }

    #[rstest]
    #[case(R1 | DUPLICATE)]
    #[case(R1 | MATE_UNMAPPED)]
    #[case(FIRST_SEGMENT)]
    #[case(PAIRED)]
    fn test_filtered_records_break_the_pair(sample: SampleId, #[case] flags: u16) {
        let records = vec![rec("a", flags, "chr1", 100, 150), rec("a", R2, "chr1", 300, 350)];
        let (set, stats) = load_fragments(sample, records).unwrap();

        assert!(set.is_empty());
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.unmatched, 1);
    }

    #[rstest]
    fn test_discordant_mates(sample: SampleId) {
        let records = vec![rec("a", R1, "chr1", 100, 150), rec("a", R2, "chr2", 300, 350)];
        let (set, stats) = load_fragments(sample, records).unwrap();
        assert!(set.is_empty());
        assert_eq!(stats.discordant, 1);
    }

    #[rstest]
    fn test_malformed_is_skipped_io_is_fatal(sample: SampleId) {
        let records = vec![
            Err(AlignmentError::Malformed("bad cigar".to_string())),
            rec("a", R1, "chr1", 100, 150),
            rec("a", R2, "chr1", 300, 350),
        ];
        let (set, stats) = load_fragments(sample.clone(), records).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(stats.malformed, 1);

        let records = vec![
            rec("a", R1, "chr1", 100, 150),
            Err(AlignmentError::Io(std::io::Error::other("truncated"))),
        ];
        assert!(matches!(load_fragments(sample, records), Err(QcError::Io(_))));
    }

    #[rstest]
    fn test_start_never_exceeds_end(sample: SampleId) {
        // overlapping mates where the later mate ends first
        let records = vec![rec("a", R1, "chr1", 100, 101), rec("a", R2, "chr1", 100, 101)];
        let (set, _) = load_fragments(sample, records).unwrap();
        assert!(set.iter().all(|f| f.start <= f.end));
        assert_eq!(set.fragments[0].width(), 0);
    }

    #[rstest]
    fn test_load_sample_from_sam() {
        let path = std::env::current_dir()
            .unwrap()
            .join("../tests/data/alignments/h3k27me3_R1.target.sam");
        let (set, stats) = load_sample(&path).unwrap();

        assert_eq!(set.sample, SampleId::new("h3k27me3", "R1"));
        assert_eq!(
            set.fragments,
            vec![
                Fragment::new("chr1", 100, 349),
                Fragment::new("chr1", 1000, 1199),
            ]
        );
        assert_eq!(stats.records, 8);
        assert_eq!(stats.filtered, 3);
        assert_eq!(stats.unmatched, 1);
    }

    #[rstest]
    fn test_load_sample_missing_file() {
        let path = PathBuf::from("../tests/data/alignments/missing_R1.bam");
        assert!(matches!(load_sample(&path), Err(QcError::MissingInputFile(_))));
    }
}
