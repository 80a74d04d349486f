use thiserror::Error;

/// Failures shared by every cutqc crate.
///
/// Row-level problems (`MalformedRecord`) are usually caught by the readers,
/// counted, and skipped. The remaining variants are fatal for the input that
/// produced them, never for the whole run.
#[derive(Error, Debug)]
pub enum QcError {
    #[error("Malformed record in {input} at line {line}: {reason}")]
    MalformedRecord {
        input: String,
        line: usize,
        reason: String,
    },

    #[error("Missing input file: {0}")]
    MissingInputFile(String),

    #[error("Schema mismatch in {input}: {reason}")]
    SchemaMismatch { input: String, reason: String },

    #[error("Can't derive group and replicate from sample name: {0}")]
    InvalidSampleIdentity(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QcError>;
