use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cutqc_core::errors::QcError;

///
/// Where a run finds its inputs.
///
/// Every input is a glob pattern. Alignments and peaks are required, the
/// rest may be left out.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct QcConfig {
    pub alignments: String,
    pub peaks: String,
    pub binned_counts: Option<String>,
    pub fragment_sizes: Option<String>,
    pub metadata: Option<String>,
    /// Worker threads for per-sample loading. Unset lets rayon decide.
    pub threads: Option<usize>,
}

#[derive(Error, Debug)]
pub enum QcConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("Invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Input(#[from] QcError),
}

pub type QcConfigResult<T> = std::result::Result<T, QcConfigError>;

impl TryFrom<&Path> for QcConfig {
    type Error = QcConfigError;

    fn try_from(path: &Path) -> QcConfigResult<Self> {
        let content = read_to_string(path)?;
        let config: QcConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Concrete input paths, in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QcInputs {
    pub alignments: Vec<PathBuf>,
    pub peaks: Vec<PathBuf>,
    pub binned_counts: Vec<PathBuf>,
    pub fragment_sizes: Vec<PathBuf>,
    pub metadata: Option<PathBuf>,
}

fn expand(pattern: &str) -> QcConfigResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        paths.push(entry.map_err(|e| e.into_error())?);
    }
    paths.sort();

    if paths.is_empty() {
        return Err(QcError::MissingInputFile(pattern.to_string()).into());
    }
    debug!("{pattern}: {} file(s)", paths.len());
    Ok(paths)
}

impl QcInputs {
    ///
    /// Expand every configured pattern.
    ///
    /// A configured pattern that matches no file is a missing input, whether
    /// or not the input is required. The metadata path must exist.
    pub fn resolve(config: &QcConfig) -> QcConfigResult<Self> {
        let optional = |pattern: &Option<String>| -> QcConfigResult<Vec<PathBuf>> {
            match pattern {
                Some(pattern) => expand(pattern),
                None => Ok(Vec::new()),
            }
        };

        let metadata = match &config.metadata {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    return Err(QcError::MissingInputFile(path.display().to_string()).into());
                }
                Some(path)
            }
            None => None,
        };

        Ok(QcInputs {
            alignments: expand(&config.alignments)?,
            peaks: expand(&config.peaks)?,
            binned_counts: optional(&config.binned_counts)?,
            fragment_sizes: optional(&config.fragment_sizes)?,
            metadata,
        })
    }
}
