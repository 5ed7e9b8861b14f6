//! Deterministic pseudo-ephemeris used when no precise backend answered.
//!
//! Each body moves at its mean daily motion from a fixed phase at the reference epoch
//! 2025-01-01T00:00:00 UTC. The output is plausible, smooth and reproducible, and
//! nothing more: it is not an astronomical model.

use std::collections::BTreeMap;

use hifitime::Epoch;

use crate::{
    angle::normalize,
    bodies::{Body, BodySet},
    constants::Degree,
    ephem_errors::EphemError,
    ephemeris::{BodyPosition, EngineId, EphemerisResult},
    time::{days_between, one_day_before},
};

use super::PositionBackend;

/// Phase offset at the reference epoch (degrees) and mean daily motion (degrees/day).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanMotion {
    pub offset_deg: Degree,
    pub rate_deg_per_day: f64,
}

/// Version 1 of the failsafe table. Changing a value changes every failsafe output,
/// so a new table gets a new name.
pub const FAILSAFE_TABLE_V1: [(Body, MeanMotion); 13] = [
    (Body::Sun, MeanMotion { offset_deg: 280.7, rate_deg_per_day: 0.9856 }),
    (Body::Moon, MeanMotion { offset_deg: 300.0, rate_deg_per_day: 13.1764 }),
    (Body::Mercury, MeanMotion { offset_deg: 255.0, rate_deg_per_day: 4.0923 }),
    (Body::Venus, MeanMotion { offset_deg: 327.0, rate_deg_per_day: 1.6021 }),
    (Body::Mars, MeanMotion { offset_deg: 122.0, rate_deg_per_day: 0.5240 }),
    (Body::Jupiter, MeanMotion { offset_deg: 73.0, rate_deg_per_day: 0.0831 }),
    (Body::Saturn, MeanMotion { offset_deg: 344.0, rate_deg_per_day: 0.0335 }),
    (Body::Uranus, MeanMotion { offset_deg: 53.5, rate_deg_per_day: 0.0117 }),
    (Body::Neptune, MeanMotion { offset_deg: 357.0, rate_deg_per_day: 0.0060 }),
    (Body::Pluto, MeanMotion { offset_deg: 301.0, rate_deg_per_day: 0.0040 }),
    (Body::Chiron, MeanMotion { offset_deg: 19.6, rate_deg_per_day: 0.0196 }),
    (Body::Ceres, MeanMotion { offset_deg: 295.0, rate_deg_per_day: 0.2140 }),
    (Body::Eris, MeanMotion { offset_deg: 24.0, rate_deg_per_day: 0.0018 }),
];

/// Reference epoch of [`FAILSAFE_TABLE_V1`].
pub fn failsafe_epoch() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2025, 1, 1)
}

fn mean_motion(body: Body) -> MeanMotion {
    FAILSAFE_TABLE_V1
        .iter()
        .find(|(b, _)| *b == body)
        .map(|(_, motion)| *motion)
        // every Body variant has a row, checked by failsafe_test::test_table_is_complete
        .unwrap_or(MeanMotion {
            offset_deg: 0.0,
            rate_deg_per_day: 0.0,
        })
}

/// Failsafe longitude of `body` at `instant`, in \[0, 360).
pub fn failsafe_longitude(body: Body, instant: Epoch) -> Degree {
    let motion = mean_motion(body);
    normalize(motion.offset_deg + motion.rate_deg_per_day * days_between(failsafe_epoch(), instant))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failsafe {
    bodies: Vec<Body>,
}

impl Default for Failsafe {
    fn default() -> Self {
        Failsafe::new(BodySet::default())
    }
}

impl Failsafe {
    pub fn new(body_set: BodySet) -> Self {
        Failsafe {
            bodies: body_set.bodies().to_vec(),
        }
    }

    /// Result for `instant`. Total: defined for every instant hifitime can represent.
    pub fn compute(&self, instant: Epoch) -> EphemerisResult {
        let previous = one_day_before(instant);
        let positions: BTreeMap<Body, BodyPosition> = self
            .bodies
            .iter()
            .map(|&body| {
                let position = BodyPosition::from_pair(
                    failsafe_longitude(body, previous),
                    failsafe_longitude(body, instant),
                );
                (body, position)
            })
            .collect();

        EphemerisResult::new(EngineId::failsafe(), instant, positions)
    }
}

impl PositionBackend for Failsafe {
    fn engine_id(&self) -> EngineId {
        EngineId::failsafe()
    }

    fn bodies(&self) -> Vec<Body> {
        self.bodies.clone()
    }

    fn compute(&self, instant: Epoch) -> Result<EphemerisResult, EphemError> {
        Ok(Failsafe::compute(self, instant))
    }
}
