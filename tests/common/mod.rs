//! Synthetic kernels and shared fixtures for the integration tests.
//!
//! Both writers produce the smallest files the readers accept: one linear Chebyshev
//! record per SPK segment, six coefficients (two of them used) per DE table and block.
#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use nalgebra::Vector3;
use senkron::{
    bodies::Body,
    constants::{OBLIQUITY_J2000_ARCSEC, RADSEC},
    ephem_errors::EphemError,
    ephemeris::{EngineId, EphemerisResult},
    backend::{compute_with, PositionBackend},
};

pub const DAF_RECORD: usize = 1024;

/// First JD of the synthetic DE files (2025-01-01T00:00 TDB).
pub const DE_START_JD: f64 = 2_460_676.5;
pub const DE_BLOCK_DAYS: f64 = 32.0;
pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_568;

/// Equatorial (ICRF) vector of a point in the ecliptic plane at longitude `lon_deg`.
pub fn ecliptic_point(lon_deg: f64, distance: f64) -> Vector3<f64> {
    let eps = OBLIQUITY_J2000_ARCSEC * RADSEC;
    let lon = lon_deg.to_radians();
    Vector3::new(lon.cos(), lon.sin() * eps.cos(), lon.sin() * eps.sin()) * distance
}

pub fn utf8_temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// One type 2 segment made of a single record, linear between `at_start` and `at_end`.
#[derive(Debug, Clone)]
pub struct SpkSegment {
    pub target: i32,
    pub center: i32,
    pub start_et: f64,
    pub end_et: f64,
    pub at_start: Vector3<f64>,
    pub at_end: Vector3<f64>,
}

impl SpkSegment {
    pub fn fixed(target: i32, center: i32, span: (f64, f64), position: Vector3<f64>) -> Self {
        Self::moving(target, center, span, position, position)
    }

    pub fn moving(
        target: i32,
        center: i32,
        (start_et, end_et): (f64, f64),
        at_start: Vector3<f64>,
        at_end: Vector3<f64>,
    ) -> Self {
        SpkSegment {
            target,
            center,
            start_et,
            end_et,
            at_start,
            at_end,
        }
    }
}

pub fn put_f64(bytes: &mut [u8], at: usize, value: f64) {
    bytes[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

pub fn put_i32(bytes: &mut [u8], at: usize, value: i32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Little-endian DAF/SPK image: file record, one summary record, one name record,
/// then every segment followed by its directory.
pub fn spk_bytes(segments: &[SpkSegment]) -> Vec<u8> {
    assert!(segments.len() <= 25, "a single summary record holds 25 summaries");

    let mut bytes = vec![0u8; 3 * DAF_RECORD];
    bytes[..8].copy_from_slice(b"DAF/SPK ");
    put_i32(&mut bytes, 8, 2);
    put_i32(&mut bytes, 12, 6);
    bytes[16..76].fill(b' ');
    bytes[16..35].copy_from_slice(b"SENKRON TEST KERNEL");
    put_i32(&mut bytes, 76, 2);
    put_i32(&mut bytes, 80, 2);
    bytes[88..96].copy_from_slice(b"LTL-IEEE");

    let summary_record = DAF_RECORD;
    put_f64(&mut bytes, summary_record, 0.0);
    put_f64(&mut bytes, summary_record + 8, 0.0);
    put_f64(&mut bytes, summary_record + 16, segments.len() as f64);

    for (i, segment) in segments.iter().enumerate() {
        let initial_addr = bytes.len() / 8 + 1;
        let mid = 0.5 * (segment.start_et + segment.end_et);
        let radius = 0.5 * (segment.end_et - segment.start_et);
        let c0 = (segment.at_start + segment.at_end) / 2.0;
        let c1 = (segment.at_end - segment.at_start) / 2.0;

        let mut words = vec![mid, radius];
        for axis in 0..3 {
            words.extend([c0[axis], c1[axis]]);
        }
        let rsize = words.len() as f64;
        words.extend([segment.start_et, segment.end_et - segment.start_et, rsize, 1.0]);
        for w in &words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        let final_addr = bytes.len() / 8;

        let at = summary_record + 24 + i * 40;
        put_f64(&mut bytes, at, segment.start_et);
        put_f64(&mut bytes, at + 8, segment.end_et);
        for (k, v) in [
            segment.target,
            segment.center,
            1,
            2,
            initial_addr as i32,
            final_addr as i32,
        ]
        .into_iter()
        .enumerate()
        {
            put_i32(&mut bytes, at + 16 + 4 * k, v);
        }
    }

    let free = (bytes.len() / 8 + 1) as i32;
    put_i32(&mut bytes, 84, free);
    bytes
}

pub fn write_spk(path: &Utf8Path, segments: &[SpkSegment]) {
    std::fs::write(path, spk_bytes(segments)).unwrap();
}

const DE_TABLES: usize = 11;
const DE_COEFFS: usize = 6;
const DE_RECORD_WORDS: usize = 2 + DE_TABLES * 3 * DE_COEFFS;

/// Legacy DE image starting at [`DE_START_JD`] with `n_blocks` blocks of
/// [`DE_BLOCK_DAYS`]. `position(table, jd)` gives the raw table content (barycentric,
/// geocentric for the Moon table 9); it is interpolated linearly inside each block.
pub fn de_bytes(n_blocks: usize, position: impl Fn(usize, f64) -> Vector3<f64>) -> Vec<u8> {
    let recsize = DE_RECORD_WORDS * 8;
    let mut bytes = vec![0u8; 2 * recsize];

    bytes[..6].copy_from_slice(b"JPL TE");
    let end_jd = DE_START_JD + n_blocks as f64 * DE_BLOCK_DAYS;
    put_f64(&mut bytes, 2652, DE_START_JD);
    put_f64(&mut bytes, 2660, end_jd);
    put_f64(&mut bytes, 2668, DE_BLOCK_DAYS);
    put_i32(&mut bytes, 2676, 0);
    put_f64(&mut bytes, 2680, 149_597_870.7);
    put_f64(&mut bytes, 2688, EARTH_MOON_MASS_RATIO);

    for table in 0..12 {
        let row = if table < DE_TABLES {
            [(3 + table * 3 * DE_COEFFS) as u32, DE_COEFFS as u32, 1]
        } else {
            [0, 0, 0]
        };
        for (k, v) in row.into_iter().enumerate() {
            put_u32(&mut bytes, 2696 + 12 * table + 4 * k, v);
        }
    }
    put_u32(&mut bytes, 2840, 440);

    for block in 0..n_blocks {
        let jd_start = DE_START_JD + block as f64 * DE_BLOCK_DAYS;
        let jd_end = jd_start + DE_BLOCK_DAYS;
        let mut words = vec![jd_start, jd_end];
        for table in 0..DE_TABLES {
            let a = position(table, jd_start);
            let b = position(table, jd_end);
            for axis in 0..3 {
                let mut coeffs = [0.0; DE_COEFFS];
                coeffs[0] = 0.5 * (a[axis] + b[axis]);
                coeffs[1] = 0.5 * (b[axis] - a[axis]);
                words.extend(coeffs);
            }
        }
        for w in &words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
    }
    bytes
}

pub fn write_de(path: &Utf8Path, n_blocks: usize, position: impl Fn(usize, f64) -> Vector3<f64>) {
    std::fs::write(path, de_bytes(n_blocks, position)).unwrap();
}

/// What a scripted backend does when computed.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Every body at `base + index` degrees.
    Answer(f64),
    Fail,
    Panic,
    Sleep(Duration),
}

/// Backend with scripted behaviour, counting its invocations.
pub struct ScriptedBackend {
    pub engine: EngineId,
    pub script: Script,
    pub bodies: Vec<Body>,
    pub calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(engine: &str, script: Script) -> Arc<Self> {
        Arc::new(ScriptedBackend {
            engine: EngineId::new(engine),
            script,
            bodies: vec![Body::Sun, Body::Moon, Body::Mars],
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PositionBackend for ScriptedBackend {
    fn engine_id(&self) -> EngineId {
        self.engine.clone()
    }

    fn bodies(&self) -> Vec<Body> {
        self.bodies.clone()
    }

    fn compute(&self, instant: Epoch) -> Result<EphemerisResult, EphemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Answer(base) => {
                compute_with(self.engine.clone(), instant, &self.bodies, |body, _| {
                    let index = self.bodies.iter().position(|b| *b == body).unwrap_or(0);
                    Ok(base + index as f64)
                })
            }
            Script::Fail => Err(EphemError::BackendCompute {
                engine: self.engine.to_string(),
                reason: "scripted failure".into(),
            }),
            Script::Panic => panic!("scripted panic"),
            Script::Sleep(delay) => {
                std::thread::sleep(delay);
                compute_with(self.engine.clone(), instant, &self.bodies, |_, _| Ok(0.0))
            }
        }
    }
}
