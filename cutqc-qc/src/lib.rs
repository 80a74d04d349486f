//! # Quality control for CUT&RUN and CUT&Tag samples.
//!
//! Turns per-sample alignments, peak calls and binned counts into QC tables:
//! fragment length histograms, fraction of fragments in peaks, peak
//! reproducibility across replicates and a log2 binned count matrix with its
//! sample correlation.
//!
//! ## Example
//! ```rust,no_run
//! use std::path::Path;
//! use cutqc_qc::config::{QcConfig, QcInputs};
//! use cutqc_qc::orchestrator::run;
//!
//! let config = QcConfig::try_from(Path::new("cutqc.toml")).unwrap();
//! let inputs = QcInputs::resolve(&config).unwrap();
//! let report = run(&inputs, config.threads.unwrap_or(0)).unwrap();
//!
//! for record in report.frip.iter() {
//!     println!("{}_{}: {:?}", record.group, record.replicate, record.percentage);
//! }
//! ```
pub mod config;
pub mod fragments;
pub mod frip;
pub mod histogram;
pub mod matrix;
pub mod metadata;
pub mod orchestrator;
pub mod peaks;
pub mod reproducibility;
pub mod tables;

pub use config::{QcConfig, QcConfigError, QcInputs};
pub use fragments::{LoadStats, load_fragments, load_sample};
pub use orchestrator::{QcReport, run, run_with_progress};
pub use tables::{Exclusion, QcTable};
