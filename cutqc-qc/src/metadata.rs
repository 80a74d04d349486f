use serde::Serialize;

use cutqc_core::utils::percentage;
use cutqc_io::{MetadataTable, SampleMetadata, SkippedRow};

use crate::tables::{Exclusion, QcTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentSummaryRecord {
    pub id: String,
    pub group: String,
    pub bt2_total_reads_target: u64,
    pub bt2_total_aligned_target: u64,
    pub target_alignment_rate: Option<f64>,
    pub spikein_alignment_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicationRecord {
    pub id: String,
    pub group: String,
    /// Percent, not a fraction.
    pub percent_duplication: f64,
    pub estimated_library_size: f64,
    pub read_pairs_examined: u64,
    pub unique_frag_num: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleFactorRecord {
    pub id: String,
    pub group: String,
    pub scale_factor: f64,
    pub normalised_frags: f64,
}

fn skipped_row(row: &SkippedRow) -> Exclusion {
    let identity = match &row.id {
        Some(id) => id.clone(),
        None => format!("metadata line {}", row.line),
    };
    Exclusion::new(identity, format!("malformed metadata row at line {}: {}", row.line, row.reason))
}

/// Every table built from `metadata` lists its skipped rows.
fn with_skipped<R>(table: QcTable<R>, metadata: &MetadataTable) -> QcTable<R> {
    table.with_excluded(metadata.skipped.iter().map(skipped_row))
}

/// Target and spike-in alignment rates per sample.
pub fn alignment_summary(metadata: &MetadataTable) -> QcTable<AlignmentSummaryRecord> {
    let table: QcTable<AlignmentSummaryRecord> = metadata
        .rows
        .iter()
        .map(|row| AlignmentSummaryRecord {
            id: row.id.clone(),
            group: row.group.clone(),
            bt2_total_reads_target: row.bt2_total_reads_target,
            bt2_total_aligned_target: row.bt2_total_aligned_target,
            target_alignment_rate: percentage(
                row.bt2_total_aligned_target,
                row.bt2_total_reads_target,
            ),
            spikein_alignment_rate: percentage(
                row.bt2_total_aligned_spikein,
                row.bt2_total_reads_spikein,
            ),
        })
        .collect();
    with_skipped(table, metadata)
}

///
/// Duplication summary, only when every sample went through duplicate marking.
///
/// `unique_frag_num` is the number of read pairs examined that were not
/// flagged as duplicates.
pub fn duplication_summary(metadata: &MetadataTable) -> Option<QcTable<DuplicationRecord>> {
    duplication_records(&metadata.rows).map(|table| with_skipped(table, metadata))
}

fn duplication_records(rows: &[SampleMetadata]) -> Option<QcTable<DuplicationRecord>> {
    rows.iter()
        .map(|row| {
            let fraction = row.dedup_percent_duplication?;
            let pairs = row.dedup_read_pairs_examined?;
            Some(DuplicationRecord {
                id: row.id.clone(),
                group: row.group.clone(),
                percent_duplication: fraction * 100.0,
                estimated_library_size: row.dedup_estimated_library_size?,
                read_pairs_examined: pairs,
                unique_frag_num: pairs as f64 * (1.0 - fraction),
            })
        })
        .collect::<Option<Vec<_>>>()
        .filter(|records| !records.is_empty())
        .map(QcTable::new)
}

/// Spike-in scale factors and the target read counts they normalise to.
pub fn scale_factor_summary(metadata: &MetadataTable) -> QcTable<ScaleFactorRecord> {
    let table: QcTable<ScaleFactorRecord> = metadata
        .rows
        .iter()
        .map(|row| ScaleFactorRecord {
            id: row.id.clone(),
            group: row.group.clone(),
            scale_factor: row.scale_factor,
            normalised_frags: row.bt2_total_reads_target as f64 * row.scale_factor,
        })
        .collect();
    with_skipped(table, metadata)
}
