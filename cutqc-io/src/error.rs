use std::io;
use thiserror::Error;

/// Problems met while streaming alignment records.
#[derive(Error, Debug)]
pub enum AlignmentError {
    /// One record could not be decoded. The stream carries on after it.
    #[error("Malformed alignment record: {0}")]
    Malformed(String),

    /// The underlying file could not be read. Nothing follows this.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
