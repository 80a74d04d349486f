//! # Readers for cutqc inputs.
//!
//! Alignment files are streamed with noodles. Peak calls, binned counts and
//! fragment size histograms are tab separated text, optionally gzipped. The
//! sample metadata table is CSV.
//!
//! Text readers share one row rule: the first data row fixes the schema and
//! any later row that does not fit is logged and skipped.
pub mod alignment;
pub mod binned;
pub mod error;
pub mod fragment_sizes;
pub mod metadata;
pub mod peaks;
pub mod table;

// re-expose core functions
pub use alignment::{AlignmentStream, open_alignments};
pub use binned::read_binned_counts;
pub use error::*;
pub use fragment_sizes::{FragmentSizeFile, read_fragment_sizes};
pub use metadata::{MetadataTable, SampleMetadata, SkippedRow, read_metadata};
pub use peaks::{PeakFile, read_peaks};
pub use table::ReadStats;
