//! Reader for NAIF SPK kernels (`de440s.bsp` and friends).
//!
//! - [`daf_header`]: first record of the DAF container.
//! - [`summary_record`]: segment descriptors.
//! - [`directory`]: per-segment record layout footer.
//! - [`ephemeris_record`]: Chebyshev records and their evaluation.
//! - [`naif_data`]: loader and barycentric/geocentric position queries.

pub mod daf_header;
pub mod directory;
pub mod ephemeris_record;
pub mod naif_data;
pub mod summary_record;
