//! Backend capability detection.
//!
//! A [`BackendProbe`] answers one question once per run: can this backend's data be loaded
//! here at all. It never fails and never panics; an unreadable directory, a missing file or a
//! file with the wrong magic all simply mean `false`.
//!
//! Keeping this separate from [`PositionBackend::compute`](crate::backend::PositionBackend::compute)
//! splits "is the backend installed" from "does it work for this instant", and lets tests
//! force either answer with [`StaticProbe`].

use std::{fs::File, io::Read};

use camino::{Utf8Path, Utf8PathBuf};

/// Availability check for one backend.
pub trait BackendProbe: Send + Sync {
    /// `true` when the backend's required data can be loaded.
    fn is_available(&self) -> bool;

    /// Short human readable description, used in journal messages and by `senkron probe`.
    fn describe(&self) -> String;
}

/// How a candidate kernel file is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFormat {
    /// NAIF DAF/SPK kernel, first bytes `DAF/SPK`.
    NaifSpk,
    /// Legacy JPL DE binary, recognised by its minimal header length.
    HorizonLegacy,
}

/// Bytes read by the legacy DE header parser before any record is decoded.
pub(crate) const HORIZON_MIN_HEADER_BYTES: u64 = 1 << 12;

impl KernelFormat {
    fn looks_valid(&self, path: &Utf8Path) -> bool {
        match self {
            KernelFormat::NaifSpk => {
                let mut magic = [0u8; 7];
                File::open(path)
                    .and_then(|mut f| f.read_exact(&mut magic))
                    .map(|_| &magic == b"DAF/SPK")
                    .unwrap_or(false)
            }
            KernelFormat::HorizonLegacy => path
                .metadata()
                .map(|m| m.is_file() && m.len() >= HORIZON_MIN_HEADER_BYTES)
                .unwrap_or(false),
        }
    }
}

/// Probe looking for the first plausible kernel among an ordered candidate list.
///
/// Directories are searched in order, every candidate in the first directory before any
/// candidate in the next one.
#[derive(Debug, Clone)]
pub struct KernelProbe {
    directories: Vec<Utf8PathBuf>,
    candidates: Vec<String>,
    format: KernelFormat,
}

impl KernelProbe {
    /// Arguments
    /// -----------------
    /// * `directory`: Directory holding the kernels.
    /// * `candidates`: File names, tried in order.
    /// * `format`: Expected kernel format.
    pub fn new(
        directory: impl Into<Utf8PathBuf>,
        candidates: Vec<String>,
        format: KernelFormat,
    ) -> Self {
        KernelProbe {
            directories: vec![directory.into()],
            candidates,
            format,
        }
    }

    /// Also search `directory`, after the ones already configured.
    pub fn with_fallback_dir(mut self, directory: impl Into<Utf8PathBuf>) -> Self {
        let directory = directory.into();
        if !self.directories.contains(&directory) {
            self.directories.push(directory);
        }
        self
    }

    /// Path of the first candidate that exists and has the expected format.
    pub fn locate(&self) -> Option<Utf8PathBuf> {
        self.directories
            .iter()
            .flat_map(|dir| self.candidates.iter().map(move |name| dir.join(name)))
            .find(|path| self.format.looks_valid(path))
    }

    pub fn format(&self) -> KernelFormat {
        self.format
    }
}

impl BackendProbe for KernelProbe {
    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    fn describe(&self) -> String {
        match self.locate() {
            Some(path) => format!("{:?} kernel found at {path}", self.format),
            None => format!(
                "no {:?} kernel among [{}] in {}",
                self.format,
                self.candidates.join(", "),
                self.directories
                    .iter()
                    .map(|dir| dir.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl BackendProbe for StaticProbe {
    fn is_available(&self) -> bool {
        self.0
    }

    fn describe(&self) -> String {
        if self.0 {
            "forced available".to_string()
        } else {
            "forced unavailable".to_string()
        }
    }
}

#[cfg(test)]
mod probe_test {
    use super::*;
    use std::io::Write;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let probe = KernelProbe::new(
            "/definitely/not/here",
            vec!["de421.bsp".into()],
            KernelFormat::NaifSpk,
        );
        assert!(!probe.is_available());
        assert!(probe.describe().contains("de421.bsp"));
    }

    #[test]
    fn test_naif_candidate_order_and_magic() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);

        // wrong magic: skipped
        std::fs::write(root.join("de421.bsp"), b"NOT A KERNEL").unwrap();
        let mut good = File::create(root.join("de440s.bsp")).unwrap();
        good.write_all(b"DAF/SPK ").unwrap();

        let probe = KernelProbe::new(
            root.clone(),
            vec!["de421.bsp".into(), "de440s.bsp".into(), "de430t.bsp".into()],
            KernelFormat::NaifSpk,
        );
        assert!(probe.is_available());
        assert_eq!(probe.locate().unwrap(), root.join("de440s.bsp"));
    }

    #[test]
    fn test_horizon_requires_header_length() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        std::fs::write(root.join("linux_p1550p2650.440"), vec![0u8; 100]).unwrap();

        let probe = KernelProbe::new(
            root.clone(),
            vec!["linux_p1550p2650.440".into()],
            KernelFormat::HorizonLegacy,
        );
        assert!(!probe.is_available());

        std::fs::write(
            root.join("linux_p1550p2650.440"),
            vec![0u8; HORIZON_MIN_HEADER_BYTES as usize],
        )
        .unwrap();
        assert!(probe.is_available());
    }

    #[test]
    fn test_fallback_directory_comes_last() {
        let primary = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let (primary_root, cache_root) = (utf8_dir(&primary), utf8_dir(&cache));
        std::fs::write(cache_root.join("de421.bsp"), b"DAF/SPK ").unwrap();

        let probe = KernelProbe::new(
            primary_root.clone(),
            vec!["de421.bsp".into(), "de440s.bsp".into()],
            KernelFormat::NaifSpk,
        )
        .with_fallback_dir(cache_root.clone());
        assert_eq!(probe.locate().unwrap(), cache_root.join("de421.bsp"));

        // a lower ranked candidate in the primary directory still wins
        std::fs::write(primary_root.join("de440s.bsp"), b"DAF/SPK ").unwrap();
        assert_eq!(probe.locate().unwrap(), primary_root.join("de440s.bsp"));

        std::fs::remove_file(primary_root.join("de440s.bsp")).unwrap();
        std::fs::remove_file(cache_root.join("de421.bsp")).unwrap();
        let description = probe.describe();
        assert!(description.contains(primary_root.as_str()));
        assert!(description.contains(cache_root.as_str()));
    }

    #[test]
    fn test_static_probe() {
        assert!(StaticProbe(true).is_available());
        assert!(!StaticProbe(false).is_available());
    }
}
