use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::errors::{QcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    BAM,
    SAM,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bam" => Ok(FileType::BAM),
            "sam" => Ok(FileType::SAM),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

///
/// Figure out what kind of file `path` points at, looking through a trailing `.gz`.
pub fn get_file_info(path: &Path) -> FileInfo {
    let mut file_type = FileType::UNKNOWN;
    let mut is_gzipped = false;

    if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
        let base = match filename.strip_suffix(".gz") {
            Some(base) => {
                is_gzipped = true;
                base
            }
            None => filename,
        };

        if let Some(ext) = PathBuf::from(base).extension().and_then(|e| e.to_str()) {
            file_type = FileType::from_str(ext).unwrap_or(FileType::UNKNOWN);
        }
    }

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// A path that does not exist is reported as [QcError::MissingInputFile]
/// rather than a bare io error.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = get_file_info(path).is_gzipped;
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => QcError::MissingInputFile(path.display().to_string()),
        _ => QcError::Io(e),
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// `numerator / denominator * 100`, or `None` when the denominator is zero.
///
/// Every ratio reported by cutqc goes through here so an undefined ratio is
/// never mistaken for `0.0` or `NaN`.
pub fn percentage(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64 * 100.0)
}
