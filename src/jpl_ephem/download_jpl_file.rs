//! Kernel identification and optional download.
//!
//! An [`EphemFileSource`] names one kernel the way users type it on the command line:
//! `horizon:DE440` for a legacy DE binary, `naif:de440s` (or `naif:de440s.bsp`) for an SPK
//! kernel. The download itself is only compiled with the `jpl-download` feature.

use std::fmt;

use camino::Utf8PathBuf;
use directories::BaseDirs;

use crate::ephem_errors::EphemError;

use super::horizon::horizon_version::JPLHorizonVersion;

const HORIZON_BASE_URL: &str = "https://ssd.jpl.nasa.gov/ftp/eph/planets/Linux";
const NAIF_BASE_URL: &str = "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EphemFileSource {
    JPLHorizon(JPLHorizonVersion),
    /// SPK file name, always ending in `.bsp`.
    Naif(String),
}

impl EphemFileSource {
    /// Name of the file in the ephemeris directory.
    pub fn file_name(&self) -> &str {
        match self {
            EphemFileSource::JPLHorizon(version) => version.legacy_file_name(),
            EphemFileSource::Naif(name) => name,
        }
    }

    /// Download location on the JPL servers.
    pub fn url(&self) -> String {
        match self {
            EphemFileSource::JPLHorizon(version) => {
                format!("{HORIZON_BASE_URL}/{}", version.get_filename())
            }
            EphemFileSource::Naif(name) => format!("{NAIF_BASE_URL}/{name}"),
        }
    }
}

impl TryFrom<&str> for EphemFileSource {
    type Error = EphemError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (kind, name) = value
            .split_once(':')
            .ok_or_else(|| EphemError::InvalidEphemFileSource(value.to_string()))?;
        let name = name.trim();

        match kind.trim().to_ascii_lowercase().as_str() {
            "horizon" => Ok(EphemFileSource::JPLHorizon(name.parse()?)),
            "naif" if !name.is_empty() && !name.contains('/') => {
                let name = name.to_ascii_lowercase();
                if name.ends_with(".bsp") {
                    Ok(EphemFileSource::Naif(name))
                } else {
                    Ok(EphemFileSource::Naif(format!("{name}.bsp")))
                }
            }
            _ => Err(EphemError::InvalidEphemFileSource(value.to_string())),
        }
    }
}

impl fmt::Display for EphemFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EphemFileSource::JPLHorizon(version) => write!(f, "horizon:{version}"),
            EphemFileSource::Naif(name) => write!(f, "naif:{name}"),
        }
    }
}

/// Per-user cache directory for downloaded kernels, e.g. `~/.cache/senkron/jpl_ephem`.
pub fn default_cache_dir() -> Result<Utf8PathBuf, EphemError> {
    let base_dir = BaseDirs::new()
        .ok_or_else(|| EphemError::Utf8PathError("no home directory".to_string()))?;
    let cache = Utf8PathBuf::from_path_buf(base_dir.cache_dir().to_path_buf())
        .map_err(|p| EphemError::Utf8PathError(format!("non UTF-8 cache dir {}", p.display())))?;
    Ok(cache.join("senkron").join("jpl_ephem"))
}

#[cfg(feature = "jpl-download")]
mod download {
    use camino::{Utf8Path, Utf8PathBuf};
    use tokio::{fs::File, io::AsyncWriteExt};
    use tokio_stream::StreamExt;
    use tracing::info;

    use super::EphemFileSource;
    use crate::ephem_errors::EphemError;

    /// Stream `url` into `path`, chunk by chunk.
    async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), EphemError> {
        let mut file = File::create(path).await?;
        info!("downloading {url}");

        let mut stream = reqwest::get(url).await?.error_for_status()?.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        info!("downloaded {url} to {path}");
        Ok(())
    }

    /// Make sure the kernel named by `source` is present in `directory`.
    ///
    /// Return
    /// ----------
    /// * The path of the kernel. An existing file is never downloaded again.
    pub async fn fetch_kernel(
        source: &EphemFileSource,
        directory: &Utf8Path,
    ) -> Result<Utf8PathBuf, EphemError> {
        tokio::fs::create_dir_all(directory).await?;
        let local_file = directory.join(source.file_name());
        if tokio::fs::try_exists(&local_file).await? {
            return Ok(local_file);
        }

        let partial = local_file.with_extension("part");
        download_big_file(&source.url(), &partial).await?;
        tokio::fs::rename(&partial, &local_file).await?;
        Ok(local_file)
    }
}

#[cfg(feature = "jpl-download")]
pub use download::fetch_kernel;
