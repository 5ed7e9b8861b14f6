//! Precise backend over a NAIF SPK kernel.

use hifitime::Epoch;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
    bodies::Body,
    ephem_errors::EphemError,
    ephemeris::{EngineId, EphemerisResult},
    jpl_ephem::{ecliptic_longitude, naif::naif_data::NaifData},
    probe::{BackendProbe, KernelProbe},
    time::et_seconds,
};

use super::{compute_with, PositionBackend};

#[derive(Debug)]
struct LoadedKernel {
    file_name: String,
    data: NaifData,
}

/// Geocentric ecliptic longitudes from an SPK kernel located by a [`KernelProbe`].
///
/// Every body is addressed by its NAIF id. Bodies the kernel has no segment for at all
/// (e.g. Ceres in `de440s.bsp`) are left out of the result; any other failure, such as
/// an epoch outside a segment, aborts the computation.
#[derive(Debug)]
pub struct NaifBackend {
    probe: KernelProbe,
    bodies: Vec<Body>,
    kernel: OnceCell<LoadedKernel>,
}

impl NaifBackend {
    pub fn new(probe: KernelProbe, bodies: &[Body]) -> Self {
        NaifBackend {
            probe,
            bodies: bodies.to_vec(),
            kernel: OnceCell::new(),
        }
    }

    fn get_kernel(&self) -> Result<&LoadedKernel, EphemError> {
        self.kernel.get_or_try_init(|| {
            let path = self
                .probe
                .locate()
                .ok_or_else(|| EphemError::BackendUnavailable(self.probe.describe()))?;
            let file_name = path.file_name().unwrap_or(path.as_str()).to_string();
            Ok(LoadedKernel {
                file_name,
                data: NaifData::read_naif_file(&path)?,
            })
        })
    }
}

impl PositionBackend for NaifBackend {
    fn engine_id(&self) -> EngineId {
        if let Some(kernel) = self.kernel.get() {
            return EngineId::naif(&kernel.file_name);
        }
        self.probe
            .locate()
            .and_then(|path| path.file_name().map(EngineId::naif))
            .unwrap_or_else(|| EngineId::new("naif"))
    }

    fn bodies(&self) -> Vec<Body> {
        self.bodies.clone()
    }

    fn compute(&self, instant: Epoch) -> Result<EphemerisResult, EphemError> {
        let kernel = self.get_kernel()?;
        let targets = kernel.data.targets();

        let bodies: Vec<Body> = self
            .bodies
            .iter()
            .copied()
            .filter(|body| {
                let present = targets.binary_search(&body.naif_id()).is_ok();
                if !present {
                    debug!("{} has no segment for {body}", kernel.file_name);
                }
                present
            })
            .collect();

        compute_with(
            EngineId::naif(&kernel.file_name),
            instant,
            &bodies,
            |body, at| {
                let geocentric = kernel.data.geocentric_position(body.naif_id(), et_seconds(at))?;
                Ok(ecliptic_longitude(&geocentric))
            },
        )
    }
}
