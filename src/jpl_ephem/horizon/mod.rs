//! Reader for the legacy JPL DE binaries (the files served under `eph/planets/Linux/`).
//!
//! - [`horizon_data`]: loads a binary, decodes the header and every data record, and
//!   answers geocentric positions through
//!   [`HorizonData::geocentric_position`](crate::jpl_ephem::horizon::horizon_data::HorizonData::geocentric_position).
//! - [`horizon_ids`]: IPT table indices and the mapping from [`Body`](crate::bodies::Body).
//! - [`horizon_records`]: Chebyshev coefficients of one body over one sub-interval.
//! - [`horizon_version`]: DE solution labels and their legacy file names.
//!
//! Positions are in km, ICRF axes, at TDB epochs given as MJD.

pub mod horizon_data;
pub mod horizon_ids;
pub mod horizon_records;
pub mod horizon_version;
