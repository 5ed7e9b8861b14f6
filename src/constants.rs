//! # Constants and type definitions for SENKRON
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used by the ephemeris engine: angle units, time scale offsets, the J2000 mean
//! obliquity used to rotate JPL state vectors into the ecliptic frame, and the default file
//! names read and written by an engine run.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// A full turn, in degrees
pub const FULL_CIRCLE: Degree = 360.0;

/// Half a turn, in degrees
pub const HALF_CIRCLE: Degree = 180.0;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Mean obliquity of the ecliptic at J2000.0 (IAU 1976), in arcseconds
pub const OBLIQUITY_J2000_ARCSEC: ArcSec = 84381.448;

// -------------------------------------------------------------------------------------------------
// Default file layout of an engine run
// -------------------------------------------------------------------------------------------------

/// Directory (relative to the working directory) holding the JPL kernels
pub const DEFAULT_EPHEMERIS_DIR: &str = "ephemeris";

/// File name of the persisted snapshot
pub const SNAPSHOT_FILE_NAME: &str = "ephemeris_snapshot.json";

/// File name of the human readable summary
pub const SUMMARY_FILE_NAME: &str = "ephemeris_summary.txt";

/// Run journal, relative to the output directory
pub const JOURNAL_FILE_NAME: &str = "logs/genesis_log.jsonl";

/// Module tag written in every journal line
pub const JOURNAL_MODULE: &str = "ephemeris_engine";

/// NAIF SPK kernels searched, in order, when no explicit file is configured
pub const NAIF_KERNEL_CANDIDATES: [&str; 3] = ["de421.bsp", "de440s.bsp", "de430t.bsp"];

/// Default upper bound for a single backend attempt, in seconds
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Ephemeris time, TDB seconds past J2000
pub type EphemerisSeconds = f64;
