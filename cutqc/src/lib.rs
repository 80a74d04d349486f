#[cfg(feature = "core")]
#[doc(inline)]
pub use cutqc_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use cutqc_overlaprs as overlaprs;

#[cfg(feature = "io")]
#[doc(inline)]
pub use cutqc_io as io;

#[cfg(feature = "qc")]
#[doc(inline)]
pub use cutqc_qc as qc;
