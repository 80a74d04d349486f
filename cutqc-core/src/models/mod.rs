pub mod alignment;
pub mod binned;
pub mod fragment;
pub mod interval;
pub mod peak;
pub mod peak_set;
pub mod sample;

// re-export for cleaner imports
pub use self::alignment::AlignmentRecord;
pub use self::binned::{BinnedCount, BinnedCounts};
pub use self::fragment::{Fragment, FragmentSet};
pub use self::interval::{Interval, Ranged};
pub use self::peak::Peak;
pub use self::peak_set::PeakSet;
pub use self::sample::SampleId;
