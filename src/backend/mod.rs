//! Position backends.
//!
//! A [`PositionBackend`] turns one instant into an [`EphemerisResult`]: an ecliptic
//! longitude and a retrograde flag for each body it computes. Three implementations
//! exist:
//!
//! - [`HorizonBackend`](horizon_backend::HorizonBackend): legacy JPL DE binary.
//! - [`NaifBackend`](naif_backend::NaifBackend): NAIF SPK kernel.
//! - [`Failsafe`](failsafe::Failsafe): constant-rate pseudo-ephemeris, never fails.
//!
//! All of them derive the retrograde flag the same way, through [`compute_with`].

use std::collections::BTreeMap;

use hifitime::Epoch;

use crate::{
    bodies::Body,
    constants::Degree,
    ephem_errors::EphemError,
    ephemeris::{BodyPosition, EngineId, EphemerisResult},
    time::one_day_before,
};

pub mod failsafe;
pub mod horizon_backend;
pub mod naif_backend;

/// One way of computing body longitudes.
///
/// `compute` must be a pure function of `instant` (and of the data the backend loaded),
/// so that the same instant always yields the same result. It may block on I/O the first
/// time it runs; the orchestrator calls it from the blocking pool.
pub trait PositionBackend: Send + Sync {
    /// Identifier written in results, e.g. `horizon:DE440`.
    fn engine_id(&self) -> EngineId;

    /// Bodies this backend is asked to compute.
    fn bodies(&self) -> Vec<Body>;

    fn compute(&self, instant: Epoch) -> Result<EphemerisResult, EphemError>;
}

/// Evaluate `longitude` for every body at `instant` and one day before.
///
/// Arguments
/// -----------------
/// * `engine`: identifier stored in the result.
/// * `instant`: query instant.
/// * `bodies`: bodies to evaluate, in order.
/// * `longitude`: longitude of a body at an instant, in degrees (any range).
///
/// Return
/// ----------
/// * The complete result, or the first error returned by `longitude`.
pub fn compute_with<F>(
    engine: EngineId,
    instant: Epoch,
    bodies: &[Body],
    mut longitude: F,
) -> Result<EphemerisResult, EphemError>
where
    F: FnMut(Body, Epoch) -> Result<Degree, EphemError>,
{
    let previous = one_day_before(instant);
    let positions = bodies
        .iter()
        .map(|&body| {
            let lon_prev = longitude(body, previous)?;
            let lon_now = longitude(body, instant)?;
            Ok((body, BodyPosition::from_pair(lon_prev, lon_now)))
        })
        .collect::<Result<BTreeMap<_, _>, EphemError>>()?;

    Ok(EphemerisResult::new(engine, instant, positions))
}
