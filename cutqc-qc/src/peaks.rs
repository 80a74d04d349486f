use serde::Serialize;

use cutqc_core::models::{PeakSet, Ranged, SampleId};

use crate::tables::{Exclusion, QcTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakCountRecord {
    pub group: String,
    pub replicate: String,
    pub all_peaks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakWidthRecord {
    pub group: String,
    pub replicate: String,
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub width: u32,
}

///
/// Number of peaks for every group and every replicate label.
///
/// The table is the full cross product: a replicate seen in one group but
/// missing from another shows up there with zero peaks. A sample whose peak
/// file failed gets an exclusion in place of its row.
pub fn peak_count_table(peaks: &PeakSet) -> QcTable<PeakCountRecord> {
    let replicates = peaks.replicates();
    let mut table = QcTable::default();

    for group in peaks.groups() {
        for &replicate in &replicates {
            let sample = SampleId::new(group, replicate);
            if let Some(reason) = peaks.failure(&sample) {
                table.excluded.push(Exclusion::new(sample.to_string(), reason));
                continue;
            }
            table.records.push(PeakCountRecord {
                group: group.to_string(),
                replicate: replicate.to_string(),
                all_peaks: peaks.peaks_for(group, replicate).len(),
            });
        }
    }

    table
}

/// Width of every peak, with its coordinates.
pub fn peak_width_table(peaks: &PeakSet) -> QcTable<PeakWidthRecord> {
    peaks
        .iter()
        .flat_map(|(sample, list)| {
            list.iter().map(move |peak| PeakWidthRecord {
                group: sample.group.clone(),
                replicate: sample.replicate.clone(),
                chr: peak.chr.clone(),
                start: peak.start,
                end: peak.end,
                width: peak.width(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use cutqc_core::models::{Fragment, Peak};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::histogram::fragment_length_histogram;

    fn peak(start: u32, end: u32) -> Peak {
        Peak::new("chr1", start, end, 1.0, 1.0).unwrap()
    }

    #[fixture]
    fn peak_set() -> PeakSet {
        vec![
            (SampleId::new("k27", "R1"), vec![peak(100, 200), peak(300, 350)]),
            (SampleId::new("k27", "R2"), vec![peak(120, 220)]),
            (SampleId::new("k4", "R1"), vec![]),
        ]
        .into_iter()
        .collect()
    }

    #[rstest]
    fn test_peak_count_cross_product(peak_set: PeakSet) {
        let table = peak_count_table(&peak_set);
        let rows: Vec<(&str, &str, usize)> = table
            .iter()
            .map(|r| (r.group.as_str(), r.replicate.as_str(), r.all_peaks))
            .collect();
        assert_eq!(
            rows,
            vec![("k4", "R1", 0), ("k4", "R2", 0), ("k27", "R1", 2), ("k27", "R2", 1)]
        );
    }

    #[rstest]
    fn test_failed_sample_is_not_counted_as_zero(mut peak_set: PeakSet) {
        peak_set.mark_failed(SampleId::new("k4", "R2"), "Malformed record in k4_R2.bed");
        let table = peak_count_table(&peak_set);

        assert!(!table.iter().any(|r| r.group == "k4" && r.replicate == "R2"));
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.excluded,
            vec![Exclusion::new("k4_R2", "Malformed record in k4_R2.bed")]
        );
    }

    #[rstest]
    fn test_peak_widths(peak_set: PeakSet) {
        let widths: Vec<u32> = peak_width_table(&peak_set).iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![100, 50, 100]);
    }

    #[rstest]
    fn test_widths_agree_with_fragment_lengths() {
        // both sides report |end - start| for a reversed interval
        let reversed = Peak::new("chr1", 500, 400, 1.0, 1.0).unwrap();
        let peaks: PeakSet = vec![(SampleId::new("a", "R1"), vec![reversed])]
            .into_iter()
            .collect();
        let fragment = Fragment {
            chr: "chr1".to_string(),
            start: 500,
            end: 400,
        };

        let peak_width = peak_width_table(&peaks).records[0].width;
        let fragment_hist = fragment_length_histogram(&[fragment]);
        assert_eq!(peak_width, 100);
        assert_eq!(fragment_hist, vec![(peak_width, 1)]);
    }
}
