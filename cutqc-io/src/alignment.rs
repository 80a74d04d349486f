//! Streaming SAM/BAM readers that yield [AlignmentRecord]s.
//!
//! Records are decoded one at a time into a reused buffer, so memory use does
//! not grow with the size of the alignment file.

use std::fs::File;
use std::io::{self, BufRead, ErrorKind, Read};
use std::path::Path;

use noodles::bam;
use noodles::sam;
use noodles::sam::alignment::Record as SamRecord;

use cutqc_core::errors::{QcError, Result};
use cutqc_core::models::AlignmentRecord;
use cutqc_core::utils::{FileType, get_dynamic_reader, get_file_info};

use crate::error::AlignmentError;

pub type AlignmentStream =
    Box<dyn Iterator<Item = std::result::Result<AlignmentRecord, AlignmentError>>>;

/// Something that can refill a record buffer, one alignment at a time.
trait RecordSource {
    type Record: SamRecord + Default;

    /// Returns `Ok(0)` at end of stream.
    fn read_into(&mut self, record: &mut Self::Record) -> io::Result<usize>;
}

impl<R: Read> RecordSource for bam::io::Reader<R> {
    type Record = bam::Record;

    fn read_into(&mut self, record: &mut Self::Record) -> io::Result<usize> {
        self.read_record(record)
    }
}

impl<R: BufRead> RecordSource for sam::io::Reader<R> {
    type Record = sam::Record;

    fn read_into(&mut self, record: &mut Self::Record) -> io::Result<usize> {
        self.read_record(record)
    }
}

struct Alignments<S: RecordSource> {
    source: S,
    header: sam::Header,
    record: S::Record,
    done: bool,
}

impl<S: RecordSource> Alignments<S> {
    fn new(source: S, header: sam::Header) -> Self {
        Alignments {
            source,
            header,
            record: S::Record::default(),
            done: false,
        }
    }
}

impl<S: RecordSource> Iterator for Alignments<S> {
    type Item = std::result::Result<AlignmentRecord, AlignmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.source.read_into(&mut self.record) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(convert(&self.record, &self.header)),
            Err(e) => {
                // a broken stream can't be resynchronised, report once and stop
                self.done = true;
                Some(Err(AlignmentError::Io(e)))
            }
        }
    }
}

fn malformed(e: io::Error) -> AlignmentError {
    AlignmentError::Malformed(e.to_string())
}

fn coordinate(value: usize) -> std::result::Result<u32, AlignmentError> {
    u32::try_from(value)
        .map_err(|_| AlignmentError::Malformed(format!("position {value} does not fit in 32 bits")))
}

///
/// Pull the fields fragment reconstruction needs out of a noodles record.
///
/// Positions are converted from 1-based inclusive to 0-based half-open.
fn convert<R: SamRecord>(
    record: &R,
    header: &sam::Header,
) -> std::result::Result<AlignmentRecord, AlignmentError> {
    let flags = record.flags().map_err(malformed)?;
    let name = record.name().map(|n| n.to_vec()).unwrap_or_default();

    let mut out = AlignmentRecord {
        name,
        flags: u16::from(flags),
        chr: None,
        start: None,
        end: None,
    };

    if flags.is_unmapped() {
        return Ok(out);
    }

    if let Some(id) = record.reference_sequence_id(header) {
        let idx = id.map_err(malformed)?;
        let chr = header
            .reference_sequences()
            .get_index(idx)
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| {
                AlignmentError::Malformed(format!("reference sequence {idx} is not in the header"))
            })?;
        out.chr = Some(chr);
    }

    if let Some(start) = record.alignment_start() {
        let start = start.map_err(malformed)?;
        out.start = Some(coordinate(start.get() - 1)?);
    }

    if let Some(end) = record.alignment_end() {
        let end = end.map_err(malformed)?;
        out.end = Some(coordinate(end.get())?);
    }

    Ok(out)
}

///
/// Open a `.bam` or `.sam` (optionally gzipped) file as a stream of alignment records.
///
/// The header is read up front, so a file that is not an alignment file at
/// all fails here rather than on the first record.
///
/// # Arguments
/// - path: path to the alignment file
pub fn open_alignments(path: &Path) -> Result<AlignmentStream> {
    let info = get_file_info(path);

    match info.file_type {
        FileType::BAM if info.is_gzipped => Err(QcError::SchemaMismatch {
            input: path.display().to_string(),
            reason: "BAM is already BGZF compressed, expected a plain .bam".to_string(),
        }),
        FileType::BAM => {
            let file = File::open(path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => QcError::MissingInputFile(path.display().to_string()),
                _ => QcError::Io(e),
            })?;
            let mut reader = bam::io::Reader::new(file);
            let header = reader.read_header().map_err(|e| header_error(path, e))?;
            Ok(Box::new(Alignments::new(reader, header)))
        }
        FileType::SAM => {
            let mut reader = sam::io::Reader::new(get_dynamic_reader(path)?);
            let header = reader.read_header().map_err(|e| header_error(path, e))?;
            Ok(Box::new(Alignments::new(reader, header)))
        }
        _ => Err(QcError::SchemaMismatch {
            input: path.display().to_string(),
            reason: "expected a .bam or .sam alignment file".to_string(),
        }),
    }
}

fn header_error(path: &Path, e: io::Error) -> QcError {
    QcError::SchemaMismatch {
        input: path.display().to_string(),
        reason: format!("unreadable alignment header: {e}"),
    }
}
