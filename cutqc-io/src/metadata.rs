use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use cutqc_core::errors::{QcError, Result};
use cutqc_core::utils::get_dynamic_reader;

use crate::table::ReadStats;

///
/// One row of the pipeline's per-sample summary table.
///
/// Alignment totals come from bowtie2 for the target genome and the spike-in
/// genome. The `dedup_*` columns are only present when duplicates were marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMetadata {
    pub id: String,
    pub group: String,
    pub bt2_total_reads_target: u64,
    pub bt2_total_aligned_target: u64,
    pub bt2_total_reads_spikein: u64,
    pub bt2_total_aligned_spikein: u64,
    pub scale_factor: f64,
    #[serde(default)]
    pub dedup_percent_duplication: Option<f64>,
    #[serde(default)]
    pub dedup_estimated_library_size: Option<f64>,
    #[serde(default)]
    pub dedup_read_pairs_examined: Option<u64>,
}

/// A metadata row that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    /// Value of the `id` column, when the row had one.
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    pub rows: Vec<SampleMetadata>,
    pub skipped: Vec<SkippedRow>,
}

impl MetadataTable {
    pub fn stats(&self) -> ReadStats {
        ReadStats {
            rows: self.rows.len(),
            malformed: self.skipped.len(),
        }
    }
}

fn fatal(input: &str, e: &csv::Error) -> QcError {
    match e.kind() {
        csv::ErrorKind::Io(_) => QcError::Io(std::io::Error::other(e.to_string())),
        _ => QcError::SchemaMismatch {
            input: input.to_string(),
            reason: e.to_string(),
        },
    }
}

///
/// Read the sample metadata CSV.
///
/// Extra columns are ignored. A first row that does not fit the expected
/// columns fails the whole file, a later bad row is skipped and reported in
/// [MetadataTable::skipped].
pub fn read_metadata(path: &Path) -> Result<MetadataTable> {
    let input = path.display().to_string();
    let mut reader = csv::Reader::from_reader(get_dynamic_reader(path)?);
    let headers = reader.headers().map_err(|e| fatal(&input, &e))?.clone();
    let id_column = headers.iter().position(|h| h == "id");

    let mut table = MetadataTable::default();

    for (idx, result) in reader.records().enumerate() {
        let (line, id, err) = match result {
            Ok(record) => match record.deserialize::<SampleMetadata>(Some(&headers)) {
                Ok(row) => {
                    table.rows.push(row);
                    continue;
                }
                Err(e) => {
                    let line = record.position().map(|p| p.line() as usize);
                    let id = id_column.and_then(|i| record.get(i)).map(str::to_string);
                    (line, id, e)
                }
            },
            Err(e) => (e.position().map(|p| p.line() as usize), None, e),
        };

        if idx == 0 || matches!(err.kind(), csv::ErrorKind::Io(_)) {
            return Err(fatal(&input, &err));
        }

        let line = line.unwrap_or(idx + 2);
        let malformed = QcError::MalformedRecord {
            input: input.clone(),
            line,
            reason: err.to_string(),
        };
        warn!("{malformed}, skipping");
        table.skipped.push(SkippedRow {
            line,
            id,
            reason: err.to_string(),
        });
    }

    Ok(table)
}
