use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use log::warn;

use cutqc_core::errors::{QcError, Result};
use cutqc_core::utils::get_dynamic_reader;

/// How many rows of a text table were kept and how many were skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub rows: usize,
    pub malformed: usize,
}

/// Why a row was rejected.
#[derive(Debug)]
pub(crate) enum RowError {
    /// Wrong column count or a non-numeric numeric column. Fatal if it is the first row.
    Shape(String),
    /// The row parsed but holds an impossible value.
    Value(String),
}

fn is_skippable(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

///
/// Parse column `idx` of a split row.
pub(crate) fn field<T: FromStr>(
    fields: &[&str],
    idx: usize,
    name: &str,
) -> std::result::Result<T, RowError> {
    let raw = fields
        .get(idx)
        .ok_or_else(|| {
            RowError::Shape(format!(
                "expected at least {} columns, found {}",
                idx + 1,
                fields.len()
            ))
        })?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| RowError::Shape(format!("column '{name}' is not a number: '{raw}'")))
}

///
/// Read a tab separated file, one parsed row per data line.
///
/// The first data row fixes the schema: if it has a shape problem the whole
/// input fails with [QcError::SchemaMismatch]. Any later bad row is logged,
/// counted in [ReadStats::malformed] and skipped.
pub(crate) fn read_tsv<T, F>(path: &Path, mut parse: F) -> Result<(Vec<T>, ReadStats)>
where
    F: FnMut(&[&str]) -> std::result::Result<T, RowError>,
{
    let input = path.display().to_string();
    let reader = get_dynamic_reader(path)?;

    let mut rows = Vec::new();
    let mut stats = ReadStats::default();
    let mut schema_checked = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }

        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        let first = !schema_checked;
        schema_checked = true;

        match parse(&fields) {
            Ok(row) => {
                rows.push(row);
                stats.rows += 1;
            }
            Err(RowError::Shape(reason)) if first => {
                return Err(QcError::SchemaMismatch { input, reason });
            }
            Err(RowError::Shape(reason)) | Err(RowError::Value(reason)) => {
                let err = QcError::MalformedRecord {
                    input: input.clone(),
                    line: idx + 1,
                    reason,
                };
                warn!("{err}, skipping");
                stats.malformed += 1;
            }
        }
    }

    Ok((rows, stats))
}
