//! One complete QC run.
//!
//! Loading happens per input file on a rayon pool. Once every worker has
//! returned, the tables are reduced on the calling thread from the owned
//! results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;

use cutqc_core::errors::QcError;
use cutqc_core::models::{BinnedCounts, FragmentSet, PeakSet, SampleId, sample::sample_stem};
use cutqc_io::{
    FragmentSizeFile, PeakFile, ReadStats, read_binned_counts, read_fragment_sizes, read_metadata,
    read_peaks,
};

use crate::config::QcInputs;
use crate::fragments::{LoadStats, load_sample};
use crate::frip::{FripRecord, frip_table};
use crate::histogram::{
    FragmentLengthRecord, FragmentSizeRecord, fragment_length_table, fragment_size_table,
};
use crate::matrix::{BinnedMatrix, BinnedMatrixBuilder, Log2Matrix};
use crate::metadata::{
    AlignmentSummaryRecord, DuplicationRecord, ScaleFactorRecord, alignment_summary,
    duplication_summary, scale_factor_summary,
};
use crate::peaks::{PeakCountRecord, PeakWidthRecord, peak_count_table, peak_width_table};
use crate::reproducibility::{ReproducibilityRecord, reproducibility};
use crate::tables::{Exclusion, QcTable};

/// Per-sample loader bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummaryRecord {
    pub group: String,
    pub replicate: String,
    #[serde(flatten)]
    pub stats: LoadStats,
}

/// The binned matrix with its log2 view and sample correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedReport {
    pub matrix: BinnedMatrix,
    pub log2: Log2Matrix,
    /// Indexed like `matrix.samples` on both axes.
    pub correlation: Array2<Option<f64>>,
    pub excluded: Vec<Exclusion>,
}

///
/// Every table a run produces. Built once by [run] and never changed after.
#[derive(Debug, Clone)]
pub struct QcReport {
    /// Rebuilt fragments of every sample that loaded.
    pub fragments: Vec<FragmentSet>,
    pub load_summary: QcTable<LoadSummaryRecord>,
    pub fragment_lengths: QcTable<FragmentLengthRecord>,
    pub frip: QcTable<FripRecord>,
    pub peak_counts: QcTable<PeakCountRecord>,
    pub peak_widths: QcTable<PeakWidthRecord>,
    /// `None` with fewer than two replicate labels.
    pub reproducibility: Option<QcTable<ReproducibilityRecord>>,
    pub binned: BinnedReport,
    pub fragment_sizes: QcTable<FragmentSizeRecord>,
    /// Metadata tables are `None` when no metadata file was given.
    pub alignment_summary: Option<QcTable<AlignmentSummaryRecord>>,
    pub duplication: Option<QcTable<DuplicationRecord>>,
    pub scale_factors: Option<QcTable<ScaleFactorRecord>>,
}

/// Owned results of the parallel stage, one entry per input file.
struct Loaded {
    fragments: Vec<(PathBuf, cutqc_core::errors::Result<(FragmentSet, LoadStats)>)>,
    peaks: Vec<(PathBuf, cutqc_core::errors::Result<PeakFile>)>,
    binned: Vec<(PathBuf, cutqc_core::errors::Result<(BinnedCounts, ReadStats)>)>,
    fragment_sizes: Vec<(PathBuf, cutqc_core::errors::Result<FragmentSizeFile>)>,
}

/// Identity to report for an input, falling back to the path.
fn identity(path: &Path) -> String {
    sample_stem(path)
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn exclude(path: &Path, err: &QcError) -> Exclusion {
    warn!("excluding {}: {err}", path.display());
    Exclusion::from_error(identity(path), err)
}

/// Split results into successes and exclusions, keeping input order.
fn partition<T>(
    results: Vec<(PathBuf, cutqc_core::errors::Result<T>)>,
) -> (Vec<T>, Vec<Exclusion>) {
    let mut ok = Vec::with_capacity(results.len());
    let mut excluded = Vec::new();
    for (path, res) in results {
        match res {
            Ok(value) => ok.push(value),
            Err(e) => excluded.push(exclude(&path, &e)),
        }
    }
    (ok, excluded)
}

fn par_load<T, F>(
    paths: &[PathBuf],
    bar: &ProgressBar,
    load: F,
) -> Vec<(PathBuf, cutqc_core::errors::Result<T>)>
where
    T: Send,
    F: Fn(&Path) -> cutqc_core::errors::Result<T> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let res = load(path);
            bar.inc(1);
            (path.clone(), res)
        })
        .collect()
}

///
/// Build the peak set from loaded peak files.
///
/// Returns the set, every peak exclusion, and the exclusions the set cannot
/// carry itself: files with no sample identity and second files for a sample
/// that already has peaks. A failed file with an identity is marked failed
/// in the set, so tables built from it can report it in place.
fn collect_peaks(
    results: Vec<(PathBuf, cutqc_core::errors::Result<PeakFile>)>,
) -> (PeakSet, Vec<Exclusion>, Vec<Exclusion>) {
    let mut peak_set = PeakSet::new();
    let mut all = Vec::new();
    let mut unattributed = Vec::new();
    let mut errors = Vec::new();

    for (path, res) in results {
        match res {
            Ok(file) => {
                let sample = file.sample.clone();
                if peak_set.get(&sample).is_some() {
                    let err = QcError::SchemaMismatch {
                        input: path.display().to_string(),
                        reason: format!("more than one peak file for {sample}"),
                    };
                    let exclusion = exclude(&path, &err);
                    all.push(exclusion.clone());
                    unattributed.push(exclusion);
                    continue;
                }
                peak_set.insert(sample, file.peaks);
            }
            Err(e) => errors.push((path, e)),
        }
    }

    for (path, err) in errors {
        let exclusion = exclude(&path, &err);
        match SampleId::from_path(&path) {
            Ok(sample) if peak_set.get(&sample).is_none() => {
                peak_set.mark_failed(sample, exclusion.reason.clone());
            }
            _ => unattributed.push(exclusion.clone()),
        }
        all.push(exclusion);
    }

    (peak_set, all, unattributed)
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("loading inputs");
    bar
}

///
/// Run the full QC pipeline over resolved inputs.
///
/// # Arguments
/// - inputs: resolved input paths
/// - threads: worker threads for loading, `0` lets rayon decide
pub fn run(inputs: &QcInputs, threads: usize) -> Result<QcReport> {
    run_with_progress(inputs, threads, false)
}

///
/// Same as [run], optionally drawing a progress bar over the loading stage.
pub fn run_with_progress(
    inputs: &QcInputs,
    threads: usize,
    show_progress: bool,
) -> Result<QcReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build the loader thread pool")?;

    let total = inputs.alignments.len()
        + inputs.peaks.len()
        + inputs.binned_counts.len()
        + inputs.fragment_sizes.len();
    let bar = progress_bar(total as u64, show_progress);

    let started = Instant::now();
    let loaded = pool.install(|| Loaded {
        fragments: par_load(&inputs.alignments, &bar, load_sample),
        peaks: par_load(&inputs.peaks, &bar, read_peaks),
        binned: par_load(&inputs.binned_counts, &bar, read_binned_counts),
        fragment_sizes: par_load(&inputs.fragment_sizes, &bar, read_fragment_sizes),
    });
    bar.finish_and_clear();
    debug!("loaded {total} inputs in {:?}", started.elapsed());

    let started = Instant::now();
    let report = reduce(loaded, inputs.metadata.as_deref())?;
    debug!("reduced tables in {:?}", started.elapsed());

    info!(
        "QC finished: {} samples with fragments, {} scored for FRiP, {} binned samples",
        report.load_summary.len(),
        report.frip.len(),
        report.binned.matrix.samples.len()
    );
    Ok(report)
}

fn reduce(loaded: Loaded, metadata: Option<&Path>) -> Result<QcReport> {
    // fragments
    let (loaded_sets, fragment_failures) = partition(loaded.fragments);
    let (sets, stats): (Vec<FragmentSet>, Vec<LoadStats>) = loaded_sets.into_iter().unzip();
    let load_summary: QcTable<LoadSummaryRecord> = sets
        .iter()
        .zip(stats)
        .map(|(set, stats)| LoadSummaryRecord {
            group: set.sample.group.clone(),
            replicate: set.sample.replicate.clone(),
            stats,
        })
        .collect();
    let load_summary = load_summary.with_excluded(fragment_failures.clone());
    let fragment_lengths = fragment_length_table(&sets).with_excluded(fragment_failures.clone());

    // peaks
    let (peak_set, peak_failures, unattributed) = collect_peaks(loaded.peaks);
    let frip = frip_table(&sets, &peak_set, fragment_failures);
    let peak_counts = peak_count_table(&peak_set).with_excluded(unattributed.clone());
    let peak_widths = peak_width_table(&peak_set).with_excluded(peak_failures);
    let reproducibility = reproducibility(&peak_set).map(|t| t.with_excluded(unattributed));

    // binned counts
    let (binned_files, mut binned_failures) = partition(loaded.binned);
    let mut builder = BinnedMatrixBuilder::with_capacity(binned_files.len());
    for (counts, _) in binned_files {
        let sample = counts.sample.clone();
        if let Err(e) = builder.add(counts) {
            warn!("{e}");
            binned_failures.push(Exclusion::from_error(sample, &e));
        }
    }
    let matrix = builder.build();
    let log2 = matrix.log2();
    let correlation = log2.correlation();
    let binned = BinnedReport {
        matrix,
        log2,
        correlation,
        excluded: binned_failures,
    };

    // fragment size histograms
    let (size_files, size_failures) = partition(loaded.fragment_sizes);
    let fragment_sizes = fragment_size_table(&size_files).with_excluded(size_failures);

    // metadata
    let (alignment_summary, duplication, scale_factors) = match metadata {
        Some(path) => {
            let table = read_metadata(path).with_context(|| {
                format!("Failed to read sample metadata from {}", path.display())
            })?;
            (
                Some(alignment_summary(&table)),
                duplication_summary(&table),
                Some(scale_factor_summary(&table)),
            )
        }
        None => (None, None, None),
    };

    Ok(QcReport {
        fragments: sets,
        load_summary,
        fragment_lengths,
        frip,
        peak_counts,
        peak_widths,
        reproducibility,
        binned,
        fragment_sizes,
        alignment_summary,
        duplication,
        scale_factors,
    })
}
