//! Run configuration.
//!
//! [`EngineConfig`] is read from an optional JSON file; every field has a default, so an
//! empty object (or no file at all) is a valid configuration.
//!
//! ```json
//! {
//!   "ephemeris_dir": "/data/jpl",
//!   "body_set": "extended",
//!   "backends": ["naif", "horizon"],
//!   "backend_timeout_secs": 10
//! }
//! ```

use std::{fmt, str::FromStr, time::Duration};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    bodies::BodySet,
    constants::{
        DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_EPHEMERIS_DIR, JOURNAL_FILE_NAME,
        NAIF_KERNEL_CANDIDATES,
    },
    ephem_errors::EphemError,
    jpl_ephem::{
        download_jpl_file::{default_cache_dir, EphemFileSource},
        horizon::horizon_version::JPLHorizonVersion,
    },
    probe::{KernelFormat, KernelProbe},
};

/// Kind of precise backend, in the order they are listed in [`EngineConfig::backends`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Horizon,
    Naif,
}

impl BackendKind {
    pub fn kernel_format(&self) -> KernelFormat {
        match self {
            BackendKind::Horizon => KernelFormat::HorizonLegacy,
            BackendKind::Naif => KernelFormat::NaifSpk,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Horizon => f.pad("horizon"),
            BackendKind::Naif => f.pad("naif"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = EphemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizon" => Ok(BackendKind::Horizon),
            "naif" => Ok(BackendKind::Naif),
            _ => Err(EphemError::InvalidConfig(format!("unknown backend {s}"))),
        }
    }
}

fn default_horizon_kernels() -> Vec<String> {
    [
        JPLHorizonVersion::DE440,
        JPLHorizonVersion::DE430,
        JPLHorizonVersion::DE421,
    ]
    .iter()
    .map(|v| v.legacy_file_name().to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory scanned for kernels.
    pub ephemeris_dir: Utf8PathBuf,
    /// Searched after `ephemeris_dir`; `senkron fetch` downloads here by default.
    pub kernel_cache_dir: Option<Utf8PathBuf>,
    /// Directory receiving the snapshot and the summary.
    pub output_dir: Utf8PathBuf,
    pub body_set: BodySet,
    /// Precise backends, highest priority first. The first two successes are cross validated.
    pub backends: Vec<BackendKind>,
    /// Upper bound on one backend attempt, in seconds.
    pub backend_timeout_secs: f64,
    /// Legacy DE file names, tried in order.
    pub horizon_kernels: Vec<String>,
    /// SPK file names, tried in order.
    pub naif_kernels: Vec<String>,
    /// JSON Lines journal, relative paths are resolved against `output_dir`.
    /// `null` disables it.
    pub journal_file: Option<Utf8PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ephemeris_dir: Utf8PathBuf::from(".").join(DEFAULT_EPHEMERIS_DIR),
            kernel_cache_dir: None,
            output_dir: Utf8PathBuf::from("."),
            body_set: BodySet::Classical,
            backends: vec![BackendKind::Horizon, BackendKind::Naif],
            backend_timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS as f64,
            horizon_kernels: default_horizon_kernels(),
            naif_kernels: NAIF_KERNEL_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            journal_file: Some(Utf8PathBuf::from(JOURNAL_FILE_NAME)),
        }
    }
}

impl EngineConfig {
    /// Read a JSON configuration file. Missing fields take their default value.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, EphemError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.backend_timeout()?;
        Ok(config)
    }

    /// Per-attempt timeout.
    ///
    /// Return
    /// ----------
    /// * An [`EphemError::InvalidConfig`] when `backend_timeout_secs` is negative, NaN
    ///   or too large.
    pub fn backend_timeout(&self) -> Result<Duration, EphemError> {
        Duration::try_from_secs_f64(self.backend_timeout_secs).map_err(|e| {
            EphemError::InvalidConfig(format!(
                "backend_timeout_secs = {}: {e}",
                self.backend_timeout_secs
            ))
        })
    }

    pub fn candidates(&self, kind: BackendKind) -> &[String] {
        match kind {
            BackendKind::Horizon => &self.horizon_kernels,
            BackendKind::Naif => &self.naif_kernels,
        }
    }

    /// Probe scanning the ephemeris directory, then the kernel cache, for `kind`'s
    /// candidate files.
    pub fn probe(&self, kind: BackendKind) -> KernelProbe {
        let probe = KernelProbe::new(
            self.ephemeris_dir.clone(),
            self.candidates(kind).to_vec(),
            kind.kernel_format(),
        );
        match &self.kernel_cache_dir {
            Some(cache) => probe.with_fallback_dir(cache.clone()),
            None => probe,
        }
    }

    /// Fill `kernel_cache_dir` with the per-user cache when the configuration leaves it
    /// unset. A machine without a home directory keeps no cache.
    pub fn with_default_cache(mut self) -> Self {
        if self.kernel_cache_dir.is_none() {
            self.kernel_cache_dir = default_cache_dir().ok();
        }
        self
    }

    /// Where `senkron fetch` stores kernels: the cache when there is one.
    pub fn download_dir(&self) -> &Utf8Path {
        self.kernel_cache_dir.as_deref().unwrap_or(&self.ephemeris_dir)
    }

    /// Try `source` before any other candidate of its kind.
    pub fn pin_kernel(&mut self, source: &EphemFileSource) {
        let list = match source {
            EphemFileSource::JPLHorizon(_) => &mut self.horizon_kernels,
            EphemFileSource::Naif(_) => &mut self.naif_kernels,
        };
        let name = source.file_name().to_string();
        list.retain(|n| *n != name);
        list.insert(0, name);
    }

    /// Absolute or `output_dir`-relative journal path, if the journal is enabled.
    pub fn journal_path(&self) -> Option<Utf8PathBuf> {
        self.journal_file.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.output_dir.join(p)
            }
        })
    }
}
