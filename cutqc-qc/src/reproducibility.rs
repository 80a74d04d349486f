//! Peak reproducibility across replicates.
//!
//! For each group and each starting replicate, the peaks of that replicate
//! are intersected with every other replicate in cyclic order. Whatever
//! survives all the intersections counts as reproduced.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use cutqc_core::models::{Peak, PeakSet, SampleId};
use cutqc_core::utils::percentage;
use cutqc_overlaprs::join;

use crate::tables::{Exclusion, QcTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReproducibilityRecord {
    pub group: String,
    pub replicate: String,
    /// Peaks of this replicate before any filtering.
    pub all_peaks: usize,
    /// Distinct (chromosome, start) positions overlapped in every other replicate.
    pub no_peaks_reproduced: usize,
    /// `no_peaks_reproduced / all_peaks * 100`, `None` when there are no peaks.
    pub rate: Option<f64>,
}

/// Sort by coordinates and drop repeats.
fn dedup_coordinates(mut peaks: Vec<Peak>) -> Vec<Peak> {
    peaks.sort_by(|a, b| a.key().cmp(&b.key()));
    peaks.dedup_by(|a, b| a.key() == b.key());
    peaks
}

///
/// Keep the peaks of `own` that overlap at least one peak in each of
/// `others`, intersected one replicate at a time in the order given.
fn fold_overlaps<'a, I>(own: &[Peak], others: I) -> Vec<Peak>
where
    I: IntoIterator<Item = &'a [Peak]>,
{
    let mut running = dedup_coordinates(own.to_vec());

    for subject in others {
        if running.is_empty() {
            break;
        }
        let kept: Vec<Peak> = join(&running, subject)
            .into_iter()
            .map(|hit| hit.query.clone())
            .collect();
        running = dedup_coordinates(kept);
    }

    running
}

///
/// Reproducibility of every group/replicate peak set.
///
/// Replicate labels are pooled across all groups. A replicate a group does
/// not have counts as an empty peak list, so nothing in that group is
/// reproduced. With one replicate label or none there is nothing to compare
/// and the result is `None`.
///
/// A group with a failed peak file has no records at all: every replicate of
/// it is listed as excluded.
pub fn reproducibility(peaks: &PeakSet) -> Option<QcTable<ReproducibilityRecord>> {
    let replicates = peaks.replicates();
    let r = replicates.len();
    if r <= 1 {
        debug!("{r} replicate(s), skipping reproducibility");
        return None;
    }

    let mut records = Vec::with_capacity(peaks.groups().len() * r);
    let mut excluded = Vec::new();

    for group in peaks.groups() {
        let samples: Vec<SampleId> = replicates
            .iter()
            .map(|rep| SampleId::new(group, *rep))
            .collect();
        let failed: Vec<String> = samples
            .iter()
            .filter(|sample| peaks.failure(sample).is_some())
            .map(|sample| sample.to_string())
            .collect();

        if !failed.is_empty() {
            debug!("skipping reproducibility for group {group}, failed: {}", failed.join(", "));
            for sample in &samples {
                let reason = match peaks.failure(sample) {
                    Some(reason) => reason.to_string(),
                    None => format!("not computed, peaks unusable for {}", failed.join(", ")),
                };
                excluded.push(Exclusion::new(sample.to_string(), reason));
            }
            continue;
        }

        for i in 0..r {
            let own = peaks.peaks_for(group, replicates[i]);
            let others = (1..r).map(|k| peaks.peaks_for(group, replicates[(i + k) % r]));

            let reproduced = fold_overlaps(own, others);
            let no_peaks_reproduced = reproduced
                .iter()
                .map(|p| (p.chr.as_str(), p.start))
                .collect::<HashSet<_>>()
                .len();

            records.push(ReproducibilityRecord {
                group: group.to_string(),
                replicate: replicates[i].to_string(),
                all_peaks: own.len(),
                no_peaks_reproduced,
                rate: percentage(no_peaks_reproduced as u64, own.len() as u64),
            });
        }
    }

    Some(QcTable { records, excluded })
}

#[cfg(test)]
mod tests {
    use super::*;

    use cutqc_core::models::SampleId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn peak(chr: &str, start: u32, end: u32) -> Peak {
        Peak::new(chr, start, end, 1.0, 1.0).unwrap()
    }

    fn peak_set(entries: Vec<(&str, &str, Vec<Peak>)>) -> PeakSet {
        entries
            .into_iter()
            .map(|(g, r, p)| (SampleId::new(g, r), p))
            .collect()
    }

    fn find<'a>(
        table: &'a QcTable<ReproducibilityRecord>,
        group: &str,
        rep: &str,
    ) -> &'a ReproducibilityRecord {
        table
            .iter()
            .find(|r| r.group == group && r.replicate == rep)
            .unwrap()
    }

    #[rstest]
    fn test_two_replicates_single_overlap() {
        let peaks = peak_set(vec![
            ("A", "1", vec![peak("chr1", 100, 200)]),
            ("A", "2", vec![peak("chr1", 150, 250)]),
        ]);

        // the join itself sees the shared stretch
        let r1 = peaks.peaks_for("A", "1");
        let r2 = peaks.peaks_for("A", "2");
        let hits = join(r1, r2);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].intersection(), ("chr1", 150, 200));

        let table = reproducibility(&peaks).unwrap();
        let rec = find(&table, "A", "1");
        assert_eq!(rec.all_peaks, 1);
        assert_eq!(rec.no_peaks_reproduced, 1);
        assert_eq!(rec.rate, Some(100.0));
    }

    #[rstest]
    fn test_single_replicate_has_no_table() {
        let peaks = peak_set(vec![
            ("A", "R1", vec![peak("chr1", 100, 200)]),
            ("B", "R1", vec![peak("chr1", 100, 200)]),
        ]);
        assert!(reproducibility(&peaks).is_none());
        assert!(reproducibility(&PeakSet::new()).is_none());
    }

    #[rstest]
    fn test_three_replicates_cyclic() {
        let peaks = peak_set(vec![
            (
                "A",
                "R1",
                vec![peak("chr1", 100, 200), peak("chr1", 1000, 1100), peak("chr2", 5, 50)],
            ),
            ("A", "R2", vec![peak("chr1", 150, 160), peak("chr1", 1050, 1060)]),
            ("A", "R3", vec![peak("chr1", 190, 300)]),
        ]);
        let table = reproducibility(&peaks).unwrap();
        assert_eq!(table.len(), 3);

        // R1 -> R2 keeps 100-200 and 1000-1100, R3 keeps only 100-200
        let r1 = find(&table, "A", "R1");
        assert_eq!((r1.all_peaks, r1.no_peaks_reproduced), (3, 1));
        assert!((r1.rate.unwrap() - 100.0 / 3.0).abs() < 1e-9);

        // R2 -> R3 drops 150-160 (ends before 190) and 1050-1060
        let r2 = find(&table, "A", "R2");
        assert_eq!((r2.all_peaks, r2.no_peaks_reproduced), (2, 0));
        assert_eq!(r2.rate, Some(0.0));

        // R3 -> R1 keeps 190-300, then R2 has nothing past 160
        let r3 = find(&table, "A", "R3");
        assert_eq!((r3.all_peaks, r3.no_peaks_reproduced), (1, 0));
    }

    #[rstest]
    fn test_missing_replicate_in_group() {
        let peaks = peak_set(vec![
            ("A", "R1", vec![peak("chr1", 100, 200)]),
            ("A", "R2", vec![peak("chr1", 100, 200)]),
            ("B", "R1", vec![peak("chr1", 100, 200)]),
        ]);
        let table = reproducibility(&peaks).unwrap();
        assert_eq!(table.len(), 4);

        let b1 = find(&table, "B", "R1");
        assert_eq!((b1.all_peaks, b1.no_peaks_reproduced), (1, 0));

        let b2 = find(&table, "B", "R2");
        assert_eq!(b2.all_peaks, 0);
        assert_eq!(b2.rate, None);
    }

    #[rstest]
    fn test_failed_replicate_excludes_its_group() {
        let mut peaks = peak_set(vec![
            ("A", "R1", vec![peak("chr1", 100, 200)]),
            ("A", "R2", vec![peak("chr1", 100, 200)]),
            ("B", "R1", vec![peak("chr1", 100, 200)]),
        ]);
        peaks.mark_failed(SampleId::new("B", "R2"), "Malformed record in B_R2.bed");
        let table = reproducibility(&peaks).unwrap();

        let groups: Vec<&str> = table.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["A", "A"]);

        assert_eq!(
            table.excluded,
            vec![
                Exclusion::new("B_R1", "not computed, peaks unusable for B_R2"),
                Exclusion::new("B_R2", "Malformed record in B_R2.bed"),
            ]
        );
    }

    #[rstest]
    fn test_failed_replicate_still_counts_as_a_label() {
        let mut peaks = peak_set(vec![("A", "R1", vec![peak("chr1", 100, 200)])]);
        peaks.mark_failed(SampleId::new("A", "R2"), "bad");

        let table = reproducibility(&peaks).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.excluded.len(), 2);
    }

    #[rstest]
    fn test_duplicate_starts_count_once() {
        let peaks = peak_set(vec![
            (
                "A",
                "R1",
                vec![peak("chr1", 100, 200), peak("chr1", 100, 180), peak("chr1", 100, 200)],
            ),
            ("A", "R2", vec![peak("chr1", 150, 250)]),
        ]);
        let table = reproducibility(&peaks).unwrap();
        let r1 = find(&table, "A", "R1");
        assert_eq!(r1.all_peaks, 3);
        assert_eq!(r1.no_peaks_reproduced, 1);
    }
}
