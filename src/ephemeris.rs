//! Result types produced by a single backend call.
//!
//! An [`EphemerisResult`] is built atomically by one [`PositionBackend`](crate::backend::PositionBackend)
//! invocation and is immutable afterwards: fields are private and only exposed through
//! accessors. Body entries are kept in a [`BTreeMap`] so that two equal results serialize to
//! byte-identical JSON.

use std::{collections::BTreeMap, fmt};

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    angle::{normalize, signed_delta},
    bodies::Body,
    constants::Degree,
    time::epoch_iso,
};

/// Longitude of one body at the query instant, with its derived motion flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    longitude_deg: Degree,
    retrograde: bool,
}

impl BodyPosition {
    /// Build a position from the longitude one day before and the longitude at the instant.
    ///
    /// Both values are normalized first. The body is flagged retrograde when it moved
    /// backward along the shortest arc between the two samples.
    pub fn from_pair(lon_prev: Degree, lon_now: Degree) -> Self {
        let lon_prev = normalize(lon_prev);
        let lon_now = normalize(lon_now);
        BodyPosition {
            longitude_deg: lon_now,
            retrograde: signed_delta(lon_prev, lon_now) < 0.0,
        }
    }

    pub fn longitude_deg(&self) -> Degree {
        self.longitude_deg
    }

    pub fn retrograde(&self) -> bool {
        self.retrograde
    }
}

/// Identifier of the backend that produced a result.
///
/// Precise backends carry a sub-identifier, e.g. `horizon:DE440` or `naif:de440s.bsp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(String);

impl EngineId {
    pub const FAILSAFE: &'static str = "failsafe";
    pub const MULTI: &'static str = "multi";

    pub fn new(id: impl Into<String>) -> Self {
        EngineId(id.into())
    }

    pub fn horizon(version: &str) -> Self {
        EngineId(format!("horizon:{version}"))
    }

    pub fn naif(kernel: &str) -> Self {
        EngineId(format!("naif:{kernel}"))
    }

    pub fn failsafe() -> Self {
        EngineId(Self::FAILSAFE.to_string())
    }

    pub fn multi() -> Self {
        EngineId(Self::MULTI.to_string())
    }

    pub fn is_failsafe(&self) -> bool {
        self.0 == Self::FAILSAFE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Output of one backend invocation for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisResult {
    engine: EngineId,
    #[serde(with = "epoch_iso")]
    timestamp: Epoch,
    bodies: BTreeMap<Body, BodyPosition>,
}

impl EphemerisResult {
    pub fn new(engine: EngineId, timestamp: Epoch, bodies: BTreeMap<Body, BodyPosition>) -> Self {
        EphemerisResult {
            engine,
            timestamp,
            bodies,
        }
    }

    pub fn engine(&self) -> &EngineId {
        &self.engine
    }

    pub fn timestamp(&self) -> Epoch {
        self.timestamp
    }

    pub fn bodies(&self) -> &BTreeMap<Body, BodyPosition> {
        &self.bodies
    }

    pub fn get(&self, body: Body) -> Option<&BodyPosition> {
        self.bodies.get(&body)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;

    #[test]
    fn test_body_position_motion() {
        let direct = BodyPosition::from_pair(10.0, 11.0);
        assert_eq!(direct.longitude_deg(), 11.0);
        assert!(!direct.retrograde());

        let backward = BodyPosition::from_pair(11.0, 10.5);
        assert!(backward.retrograde());

        // wraps through 0°
        let wrap = BodyPosition::from_pair(359.5, 0.5);
        assert!(!wrap.retrograde());
        let wrap_back = BodyPosition::from_pair(0.5, 359.5);
        assert!(wrap_back.retrograde());
        assert_eq!(wrap_back.longitude_deg(), 359.5);

        let stationary = BodyPosition::from_pair(42.0, 42.0);
        assert!(!stationary.retrograde());
    }

    #[test]
    fn test_body_position_normalizes() {
        let p = BodyPosition::from_pair(-2.0, -1.0);
        assert_eq!(p.longitude_deg(), 359.0);
        assert!(!p.retrograde());
    }

    #[test]
    fn test_engine_id() {
        assert_eq!(EngineId::horizon("DE440").as_str(), "horizon:DE440");
        assert_eq!(EngineId::naif("de421.bsp").to_string(), "naif:de421.bsp");
        assert!(EngineId::failsafe().is_failsafe());
        assert!(!EngineId::multi().is_failsafe());
    }

    #[test]
    fn test_result_json_shape() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
        let mut bodies = BTreeMap::new();
        bodies.insert(Body::Sun, BodyPosition::from_pair(279.0, 280.0));
        let result = EphemerisResult::new(EngineId::failsafe(), t, bodies);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["engine"], "failsafe");
        assert_eq!(json["timestamp"], "2025-01-01T00:00:00Z");
        assert_eq!(json["bodies"]["Sun"]["longitude_deg"], 280.0);
        assert_eq!(json["bodies"]["Sun"]["retrograde"], false);

        let back: EphemerisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
