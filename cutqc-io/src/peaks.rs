use std::path::Path;

use log::debug;

use cutqc_core::errors::Result;
use cutqc_core::models::{Peak, SampleId};

use crate::table::{ReadStats, RowError, field, read_tsv};

/// Peaks read from one peak-caller output file.
#[derive(Debug, Clone)]
pub struct PeakFile {
    pub sample: SampleId,
    pub peaks: Vec<Peak>,
    pub stats: ReadStats,
}

///
/// Read a peak file with columns `chrom start end total_signal max_signal [...]`.
///
/// The sample identity comes from the file name. Reversed coordinates are
/// reordered. Zero-width peaks are skipped as malformed rows.
///
/// # Arguments
/// - path: path to a (possibly gzipped) bed-like peak file
pub fn read_peaks(path: &Path) -> Result<PeakFile> {
    let sample = SampleId::from_path(path)?;

    let (peaks, stats) = read_tsv(path, |fields| {
        let chr: &str = fields
            .first()
            .copied()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RowError::Shape("missing chromosome".to_string()))?;
        let start: u32 = field(fields, 1, "start")?;
        let end: u32 = field(fields, 2, "end")?;
        let total_signal: f64 = field(fields, 3, "total_signal")?;
        let max_signal: f64 = field(fields, 4, "max_signal")?;

        Peak::new(chr, start, end, total_signal, max_signal)
            .ok_or_else(|| RowError::Value(format!("zero-width peak at {chr}:{start}")))
    })?;

    debug!("{}: {} peaks read from {}", sample, peaks.len(), path.display());

    Ok(PeakFile {
        sample,
        peaks,
        stats,
    })
}
