//! Fraction of fragments in peaks.

use serde::Serialize;

use cutqc_core::models::{Fragment, FragmentSet, Peak, PeakSet};
use cutqc_core::utils::percentage;
use cutqc_overlaprs::count_overlapping;

use crate::tables::{Exclusion, QcTable};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FripCounts {
    pub mapped_frags: u64,
    pub frags_in_peaks: u64,
    /// `None` when there are no fragments at all.
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FripRecord {
    pub group: String,
    pub replicate: String,
    pub mapped_frags: u64,
    pub frags_in_peaks: u64,
    pub percentage: Option<f64>,
}

///
/// Count the fragments overlapping at least one peak.
///
/// The peaks are indexed once per chromosome, then each fragment asks for
/// any overlap and stops at the first hit.
pub fn frip_for(fragments: &[Fragment], peaks: &[Peak]) -> FripCounts {
    let mapped_frags = fragments.len() as u64;
    let frags_in_peaks = count_overlapping(fragments, peaks) as u64;

    FripCounts {
        mapped_frags,
        frags_in_peaks,
        percentage: percentage(frags_in_peaks, mapped_frags),
    }
}

///
/// FRiP for every loaded sample.
///
/// A sample without usable peaks of its own is excluded rather than scored
/// as zero. When its peak file failed to load, that failure is the reason
/// given. `failures` carries samples whose fragments never loaded.
pub fn frip_table<I>(sets: &[FragmentSet], peaks: &PeakSet, failures: I) -> QcTable<FripRecord>
where
    I: IntoIterator<Item = Exclusion>,
{
    let mut records = Vec::with_capacity(sets.len());
    let mut excluded: Vec<Exclusion> = failures.into_iter().collect();

    for set in sets {
        let Some(sample_peaks) = peaks.get(&set.sample) else {
            let reason = match peaks.failure(&set.sample) {
                Some(reason) => reason.to_string(),
                None => format!("no peak file for {}", set.sample),
            };
            excluded.push(Exclusion::new(set.sample.to_string(), reason));
            continue;
        };

        let counts = frip_for(&set.fragments, sample_peaks);
        records.push(FripRecord {
            group: set.sample.group.clone(),
            replicate: set.sample.replicate.clone(),
            mapped_frags: counts.mapped_frags,
            frags_in_peaks: counts.frags_in_peaks,
            percentage: counts.percentage,
        });
    }

    QcTable { records, excluded }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cutqc_core::models::SampleId;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn peak(chr: &str, start: u32, end: u32) -> Peak {
        Peak::new(chr, start, end, 1.0, 1.0).unwrap()
    }

    #[fixture]
    fn peaks() -> Vec<Peak> {
        vec![peak("chr1", 100, 200), peak("chr1", 1000, 2000), peak("chr2", 0, 50)]
    }

    #[rstest]
    fn test_frip_for(peaks: Vec<Peak>) {
        let fragments = vec![
            Fragment::new("chr1", 150, 300),
            Fragment::new("chr1", 200, 999),
            Fragment::new("chr1", 1500, 1600),
            Fragment::new("chr2", 49, 400),
        ];
        let counts = frip_for(&fragments, &peaks);
        assert_eq!(counts.mapped_frags, 4);
        assert_eq!(counts.frags_in_peaks, 3);
        assert_eq!(counts.percentage, Some(75.0));
    }

    #[rstest]
    fn test_frip_without_fragments_is_undefined(peaks: Vec<Peak>) {
        let counts = frip_for(&[], &peaks);
        assert_eq!(counts.mapped_frags, 0);
        assert_eq!(counts.frags_in_peaks, 0);
        assert_eq!(counts.percentage, None);
    }

    #[rstest]
    fn test_frip_table(peaks: Vec<Peak>) {
        let sets = vec![
            FragmentSet {
                sample: SampleId::new("k27", "R1"),
                fragments: vec![Fragment::new("chr1", 150, 300), Fragment::new("chr3", 0, 10)],
            },
            FragmentSet {
                sample: SampleId::new("k27", "R2"),
                fragments: vec![Fragment::new("chr1", 150, 300)],
            },
            FragmentSet {
                sample: SampleId::new("k27", "R3"),
                fragments: vec![Fragment::new("chr1", 150, 300)],
            },
        ];
        let peak_set: PeakSet = vec![
            (SampleId::new("k27", "R1"), peaks),
            (SampleId::new("k27", "R2"), vec![]),
        ]
        .into_iter()
        .collect();

        let failures = vec![Exclusion::new("k27_R4", "Missing input file: x")];
        let table = frip_table(&sets, &peak_set, failures);

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].percentage, Some(50.0));
        // an empty peak file scores zero, it is not excluded
        assert_eq!(table.records[1].frags_in_peaks, 0);
        assert_eq!(table.records[1].percentage, Some(0.0));

        let excluded: Vec<&str> = table.excluded.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(excluded, vec!["k27_R4", "k27_R3"]);
        assert_eq!(table.excluded[1].reason, "no peak file for k27_R3");
    }

    #[rstest]
    fn test_frip_reports_peak_load_failure(peaks: Vec<Peak>) {
        let sets = vec![
            FragmentSet {
                sample: SampleId::new("k27", "R1"),
                fragments: vec![Fragment::new("chr1", 150, 300)],
            },
            FragmentSet {
                sample: SampleId::new("k27", "R2"),
                fragments: vec![Fragment::new("chr1", 150, 300)],
            },
        ];
        let mut peak_set: PeakSet = vec![(SampleId::new("k27", "R1"), peaks)].into_iter().collect();
        peak_set.mark_failed(
            SampleId::new("k27", "R2"),
            "Input k27_R2.bed does not match the expected schema: bad first row",
        );

        let table = frip_table(&sets, &peak_set, Vec::<Exclusion>::new());

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.excluded,
            vec![Exclusion::new(
                "k27_R2",
                "Input k27_R2.bed does not match the expected schema: bad first row"
            )]
        );
        assert!(!table.excluded[0].reason.contains("Missing input file"));
    }
}
