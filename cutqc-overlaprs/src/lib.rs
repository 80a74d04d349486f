//! Interval overlap engine for cutqc.
//!
//! Every overlap question cutqc asks goes through this crate. Fraction of
//! fragments in peaks and replicate reproducibility both use it, and neither
//! reimplements interval logic of its own.
//!
//! ## Quick Start
//!
//! ```rust
//! use cutqc_core::models::{Fragment, Peak};
//! use cutqc_overlaprs::ops::{count_overlapping, join};
//!
//! let peaks = vec![Peak::new("chr1", 100, 200, 10.0, 4.0).unwrap()];
//! let frags = vec![
//!     Fragment::new("chr1", 150, 300),
//!     Fragment::new("chr1", 400, 500),
//! ];
//!
//! assert_eq!(count_overlapping(&frags, &peaks), 1);
//!
//! let replicate = vec![Peak::new("chr1", 150, 250, 1.0, 1.0).unwrap()];
//! let hits = join(&peaks, &replicate);
//! assert_eq!(hits[0].intersection(), ("chr1", 150, 200));
//! ```

/// Augmented Interval List implementation.
///
/// See [`AIList`] for details.
pub mod ailist;

/// One overlap index per chromosome.
pub mod chrom_index;

pub mod ops;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::ailist::AIList;
pub use self::chrom_index::{ChromIndex, IntoChromIndex};
pub use self::ops::{JoinHit, count_overlapping, join, overlap_count, overlaps};
pub use self::traits::{Interval, Overlapper};
