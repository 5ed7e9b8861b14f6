use hifitime::{Epoch, Unit};
use std::str::FromStr;

use crate::{
    constants::{EphemerisSeconds, JDTOMJD, MJD, SECONDS_PER_DAY},
    ephem_errors::EphemError,
};

/// The instant exactly one day before `instant`, used for the day-over-day motion test.
pub fn one_day_before(instant: Epoch) -> Epoch {
    instant - Unit::Day * 1
}

/// Elapsed time from `from` to `to`, in days (negative when `to` precedes `from`).
pub fn days_between(from: Epoch, to: Epoch) -> f64 {
    (to - from).to_seconds() / SECONDS_PER_DAY
}

/// Modified Julian Date in the TDB scale, as expected by the legacy DE binaries.
pub fn mjd_tdb(instant: Epoch) -> MJD {
    instant.to_jde_tdb_days() - JDTOMJD
}

/// Ephemeris time (TDB seconds past J2000), as expected by the SPK kernels.
pub fn et_seconds(instant: Epoch) -> EphemerisSeconds {
    instant.to_et_seconds()
}

/// Current wall-clock instant.
pub fn now_utc() -> Result<Epoch, EphemError> {
    Epoch::now().map_err(|e| EphemError::InvalidInstant(format!("system clock: {e}")))
}

/// Format an instant as an ISO 8601 UTC string, e.g. `2025-03-01T12:00:00Z`.
///
/// Sub-second parts are written with nanosecond precision only when non-zero, so that
/// whole-second instants keep the short form.
pub fn format_utc(instant: Epoch) -> String {
    let (y, m, d, hh, mm, ss, ns) = instant.to_gregorian_utc();
    if ns == 0 {
        format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}Z")
    } else {
        format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}.{ns:09}Z")
    }
}

/// Parse a user supplied instant.
///
/// Accepted forms
/// -----------------
/// * `now` (case-insensitive): the current wall-clock instant.
/// * anything [`hifitime::Epoch`] parses: ISO 8601 UTC as written in snapshots
///   (`2025-03-01T12:00:00Z`), or an explicit time scale (`2025-03-01T12:00:00 TDB`).
pub fn parse_instant(s: &str) -> Result<Epoch, EphemError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return now_utc();
    }
    Epoch::from_str(trimmed).map_err(|e| EphemError::InvalidInstant(format!("{trimmed}: {e}")))
}

/// Serde adapter writing an [`Epoch`] as an ISO 8601 UTC string.
pub mod epoch_iso {
    use hifitime::Epoch;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(epoch: &Epoch, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_utc(*epoch))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Epoch, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(D::Error::custom)
    }
}
