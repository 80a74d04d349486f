use std::path::Path;

use cutqc_core::errors::{QcError, Result};
use cutqc_core::models::BinnedCounts;
use cutqc_core::models::sample::sample_stem;

use crate::table::{ReadStats, RowError, field, read_tsv};

///
/// Read a binned fragment count file with columns `chrom bin count sample`.
///
/// The sample name is taken from the `sample` column of the first row, up to
/// its first `.`. A file with no rows falls back to its own file stem.
pub fn read_binned_counts(path: &Path) -> Result<(BinnedCounts, ReadStats)> {
    let (rows, stats) = read_tsv(path, |fields| {
        let chr = fields
            .first()
            .copied()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RowError::Shape("missing chromosome".to_string()))?;
        let bin: u64 = field(fields, 1, "bin")?;
        let count: u64 = field(fields, 2, "count")?;
        let sample = fields
            .get(3)
            .map(|s| s.split('.').next().unwrap_or_default().trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RowError::Shape("missing sample column".to_string()))?;

        Ok((chr.to_string(), bin, count, sample.to_string()))
    })?;

    let sample = match rows.first() {
        Some((_, _, _, sample)) => sample.clone(),
        None => sample_stem(path)
            .map(|s| s.to_string())
            .ok_or_else(|| QcError::SchemaMismatch {
                input: path.display().to_string(),
                reason: "no rows and no usable file name".to_string(),
            })?,
    };

    let mut counts = BinnedCounts::new(sample);
    counts.counts.reserve(rows.len());
    for (chr, bin, count, _) in rows {
        counts.push(chr, bin, count);
    }

    Ok((counts, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/bins")
            .join(file_name)
    }

    #[rstest]
    fn test_read_binned_fixture() {
        let path = get_test_path("h3k27me3_R1.bin500.awk.bed");
        let (counts, stats) = read_binned_counts(&path).unwrap();
        assert_eq!(counts.sample, "h3k27me3_R1");
        assert_eq!(counts.len(), 4);
        assert_eq!(stats.malformed, 0);
        assert_eq!(counts.counts[1].bin, 1000);
        assert_eq!(counts.counts[1].count, 4);
    }

    #[rstest]
    fn test_read_binned_empty_uses_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("igg_R1.bin500.awk.bed");
        std::fs::write(&path, "").unwrap();

        let (counts, _) = read_binned_counts(&path).unwrap();
        assert_eq!(counts.sample, "igg_R1");
        assert!(counts.is_empty());
    }

    #[rstest]
    fn test_read_binned_missing_sample_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("igg_R1.bin500.awk.bed");
        std::fs::write(&path, "chr1\t500\t3\n").unwrap();

        assert!(matches!(read_binned_counts(&path), Err(QcError::SchemaMismatch { .. })));
    }
}
