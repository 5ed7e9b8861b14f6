//! Agreement score between two independent results for the same instant.
//!
//! For every body present in both results the absolute shortest-arc difference of the
//! longitudes is recorded. The aggregate score is `max(0, 100 - mean difference)`, so
//! a mean disagreement of one degree costs one point. When the two results share no
//! body the mean is taken as 0 and the score is 100 (vacuous agreement).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    angle::signed_delta,
    bodies::Body,
    constants::Degree,
    ephem_errors::EphemError,
    ephemeris::EphemerisResult,
    time::format_utc,
};

/// Score given when nothing disagrees.
pub const PERFECT_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    per_body_delta: BTreeMap<Body, Degree>,
    aggregate_score: f64,
}

impl ConsistencyReport {
    /// Absolute difference per common body, in \[0, 180\] degrees.
    pub fn per_body_delta(&self) -> &BTreeMap<Body, Degree> {
        &self.per_body_delta
    }

    /// Score in \[0, 100\].
    pub fn aggregate_score(&self) -> f64 {
        self.aggregate_score
    }

    /// Mean of the per-body differences, 0 when there is no common body.
    pub fn mean_delta(&self) -> Degree {
        if self.per_body_delta.is_empty() {
            0.0
        } else {
            self.per_body_delta.values().sum::<f64>() / self.per_body_delta.len() as f64
        }
    }
}

/// Compare two results computed for the same instant.
///
/// Return
/// ----------
/// * The report, symmetric in `a` and `b`.
/// * [`EphemError::ValidationPrecondition`] when the timestamps differ. This is a caller
///   bug and is never swallowed by the orchestrator.
pub fn cross_validate(
    a: &EphemerisResult,
    b: &EphemerisResult,
) -> Result<ConsistencyReport, EphemError> {
    if a.timestamp() != b.timestamp() {
        return Err(EphemError::ValidationPrecondition {
            first: format_utc(a.timestamp()),
            second: format_utc(b.timestamp()),
        });
    }

    let per_body_delta: BTreeMap<Body, Degree> = a
        .bodies()
        .iter()
        .filter_map(|(body, pos_a)| {
            b.get(*body).map(|pos_b| {
                let delta = signed_delta(pos_a.longitude_deg(), pos_b.longitude_deg()).abs();
                (*body, delta)
            })
        })
        .collect();

    let mut report = ConsistencyReport {
        per_body_delta,
        aggregate_score: PERFECT_SCORE,
    };
    report.aggregate_score = (PERFECT_SCORE - report.mean_delta()).max(0.0);
    Ok(report)
}

#[cfg(test)]
mod cross_validation_test {
    use super::*;
    use crate::ephemeris::{BodyPosition, EngineId};
    use approx::assert_abs_diff_eq;
    use hifitime::Epoch;

    fn result(engine: &str, t: Epoch, lons: &[(Body, f64)]) -> EphemerisResult {
        let bodies = lons
            .iter()
            .map(|(b, lon)| (*b, BodyPosition::from_pair(*lon, *lon)))
            .collect();
        EphemerisResult::new(EngineId::new(engine), t, bodies)
    }

    #[test]
    fn test_sun_two_degrees_apart() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result("a", t, &[(Body::Sun, 10.0)]);
        let b = result("b", t, &[(Body::Sun, 12.0)]);
        let report = cross_validate(&a, &b).unwrap();
        assert_abs_diff_eq!(report.per_body_delta()[&Body::Sun], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.aggregate_score(), 98.0, epsilon = 1e-12);
    }

    #[test]
    fn test_difference_across_zero() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result("a", t, &[(Body::Moon, 359.5)]);
        let b = result("b", t, &[(Body::Moon, 0.5)]);
        let report = cross_validate(&a, &b).unwrap();
        assert_abs_diff_eq!(report.per_body_delta()[&Body::Moon], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_score_is_symmetric() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result(
            "a",
            t,
            &[(Body::Sun, 359.2), (Body::Moon, 0.3), (Body::Mars, 120.0), (Body::Venus, 10.0)],
        );
        let b = result(
            "b",
            t,
            &[(Body::Sun, 1.1), (Body::Moon, 358.9), (Body::Mars, 121.5), (Body::Venus, 190.0)],
        );
        let ab = cross_validate(&a, &b).unwrap();
        let ba = cross_validate(&b, &a).unwrap();
        assert_eq!(ab.aggregate_score(), ba.aggregate_score());
        assert_eq!(ab.per_body_delta(), ba.per_body_delta());
        assert_abs_diff_eq!(ab.per_body_delta()[&Body::Sun], 1.9, epsilon = 1e-9);
        assert_abs_diff_eq!(ab.per_body_delta()[&Body::Moon], 1.4, epsilon = 1e-9);
        assert_abs_diff_eq!(ab.per_body_delta()[&Body::Venus], 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_identical_results_score_100() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let lons = [
            (Body::Sun, 0.0),
            (Body::Moon, 359.999),
            (Body::Mercury, 0.001),
            (Body::Jupiter, 180.0),
            (Body::Saturn, 271.25),
        ];
        let a = result("a", t, &lons);
        let b = result("b", t, &lons);
        let report = cross_validate(&a, &b).unwrap();
        assert_eq!(report.per_body_delta().len(), lons.len());
        assert!(report.per_body_delta().values().all(|delta| *delta == 0.0));
        assert_eq!(report.aggregate_score(), 100.0);
    }

    #[test]
    fn test_only_common_bodies_count() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result("a", t, &[(Body::Sun, 10.0), (Body::Ceres, 100.0)]);
        let b = result("b", t, &[(Body::Sun, 11.0), (Body::Mars, 200.0)]);
        let report = cross_validate(&a, &b).unwrap();
        assert_eq!(report.per_body_delta().len(), 1);
        assert_abs_diff_eq!(report.aggregate_score(), 99.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_is_vacuous_agreement() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result("a", t, &[(Body::Sun, 10.0)]);
        let b = result("b", t, &[(Body::Moon, 200.0)]);
        let report = cross_validate(&a, &b).unwrap();
        assert!(report.per_body_delta().is_empty());
        assert_eq!(report.aggregate_score(), 100.0);
    }

    #[test]
    fn test_timestamp_mismatch() {
        let t = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);
        let a = result("a", t, &[(Body::Sun, 10.0)]);
        let b = result("b", t + hifitime::Unit::Second * 1, &[(Body::Sun, 10.0)]);
        let err = cross_validate(&a, &b).unwrap_err();
        assert!(matches!(err, EphemError::ValidationPrecondition { .. }));
        assert!(!err.is_recoverable());
    }
}
