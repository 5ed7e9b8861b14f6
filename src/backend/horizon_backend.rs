//! Precise backend over a legacy JPL DE binary.

use hifitime::Epoch;
use once_cell::sync::OnceCell;

use crate::{
    bodies::Body,
    ephem_errors::EphemError,
    ephemeris::{EngineId, EphemerisResult},
    jpl_ephem::{
        ecliptic_longitude,
        horizon::{
            horizon_data::HorizonData, horizon_ids::HorizonID, horizon_version::JPLHorizonVersion,
        },
    },
    probe::{BackendProbe, KernelProbe},
    time::mjd_tdb,
};

use super::{compute_with, PositionBackend};

/// Geocentric ecliptic longitudes from a DE binary located by a [`KernelProbe`].
///
/// The file is read on the first [`compute`](PositionBackend::compute) and kept for the
/// lifetime of the backend. Bodies without a DE table (Chiron, Ceres, Eris) are dropped
/// from the requested list at construction.
#[derive(Debug)]
pub struct HorizonBackend {
    probe: KernelProbe,
    bodies: Vec<Body>,
    data: OnceCell<HorizonData>,
}

impl HorizonBackend {
    pub fn new(probe: KernelProbe, bodies: &[Body]) -> Self {
        HorizonBackend {
            probe,
            bodies: bodies
                .iter()
                .copied()
                .filter(|b| HorizonID::from_body(*b).is_some())
                .collect(),
            data: OnceCell::new(),
        }
    }

    /// The loaded file, reading it on first use.
    ///
    /// Return
    /// ----------
    /// * [`EphemError::BackendUnavailable`] when no candidate file is present, otherwise
    ///   the reader's error for an unreadable file.
    pub fn get_horizon_data(&self) -> Result<&HorizonData, EphemError> {
        self.data.get_or_try_init(|| {
            let path = self
                .probe
                .locate()
                .ok_or_else(|| EphemError::BackendUnavailable(self.probe.describe()))?;
            HorizonData::read_horizon_file(&path)
        })
    }

    fn longitude(data: &HorizonData, body: Body, instant: Epoch) -> Result<f64, EphemError> {
        let id = HorizonID::from_body(body).ok_or_else(|| EphemError::UnsupportedBody {
            body: body.to_string(),
            engine: EngineId::horizon(data.version()).to_string(),
        })?;
        let geocentric = data.geocentric_position(id, mjd_tdb(instant))?;
        Ok(ecliptic_longitude(&geocentric))
    }
}

impl PositionBackend for HorizonBackend {
    /// `horizon:<DE version>`, from the file header once loaded, from the file name before.
    fn engine_id(&self) -> EngineId {
        if let Some(data) = self.data.get() {
            return EngineId::horizon(data.version());
        }
        self.probe
            .locate()
            .and_then(|path| path.file_name().and_then(JPLHorizonVersion::from_legacy_file_name))
            .map(|version| EngineId::horizon(version.label()))
            .unwrap_or_else(|| EngineId::new("horizon"))
    }

    fn bodies(&self) -> Vec<Body> {
        self.bodies.clone()
    }

    fn compute(&self, instant: Epoch) -> Result<EphemerisResult, EphemError> {
        let data = self.get_horizon_data()?;
        compute_with(
            EngineId::horizon(data.version()),
            instant,
            &self.bodies,
            |body, at| HorizonBackend::longitude(data, body, at),
        )
    }
}
