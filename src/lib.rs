//! Geocentric ecliptic longitudes of the Sun, the Moon and the planets, computed from JPL
//! kernels when they are installed and from a mean motion model when they are not.
//!
//! The entry point is [`orchestrator::EphemerisOrchestrator`], which runs every available
//! [`backend::PositionBackend`], cross validates the first two answers and persists an
//! [`snapshot::EphemerisSnapshot`].

pub mod angle;
pub mod backend;
pub mod bodies;
pub mod config;
pub mod constants;
pub mod cross_validation;
pub mod ephem_errors;
pub mod ephemeris;
pub mod journal;
pub mod jpl_ephem;
pub mod orchestrator;
pub mod probe;
pub mod snapshot;
pub mod time;
