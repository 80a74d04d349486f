//! Core models for cutqc.
//!
//! Fragments, peaks, binned counts and the group/replicate identity that ties
//! them to a sample, plus the error type and file helpers every other cutqc
//! crate builds on.
pub mod errors;
pub mod models;
pub mod utils;
