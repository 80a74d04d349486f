use std::path::Path;

use cutqc_core::errors::Result;
use cutqc_core::models::SampleId;

use crate::table::{ReadStats, field, read_tsv};

/// A precomputed `size occurrences` histogram for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSizeFile {
    pub sample: SampleId,
    pub sizes: Vec<(u32, u64)>,
    pub stats: ReadStats,
}

/// Read a two column fragment size histogram. The identity comes from the file name.
pub fn read_fragment_sizes(path: &Path) -> Result<FragmentSizeFile> {
    let sample = SampleId::from_path(path)?;
    let (sizes, stats) = read_tsv(path, |fields| {
        Ok((field(fields, 0, "size")?, field(fields, 1, "occurrences")?))
    })?;

    Ok(FragmentSizeFile {
        sample,
        sizes,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::tempdir;

    #[rstest]
    fn test_read_fragment_sizes_fixture() {
        let path = std::env::current_dir()
            .unwrap()
            .join("../tests/data/frag_len/h3k27me3_R1.frag_len.txt");
        let file = read_fragment_sizes(&path).unwrap();
        assert_eq!(file.sample, SampleId::new("h3k27me3", "R1"));
        assert_eq!(file.sizes, vec![(150, 3), (151, 1), (300, 2)]);
    }

    #[rstest]
    fn test_read_fragment_sizes_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("igg_R2.frag_len.txt.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"120\t7\n121\t0\n").unwrap();
        enc.finish().unwrap();

        let file = read_fragment_sizes(&path).unwrap();
        assert_eq!(file.sample, SampleId::new("igg", "R2"));
        assert_eq!(file.sizes, vec![(120, 7), (121, 0)]);
    }
}
