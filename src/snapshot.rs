//! Persisted outcome of a run.
//!
//! A run leaves two files in the output directory, both replaced atomically (written to
//! a temporary file in the same directory, then renamed over the previous one):
//!
//! - `ephemeris_snapshot.json`: the [`EphemerisSnapshot`], machine readable.
//! - `ephemeris_summary.txt`: one line per body and source, for humans.

use std::{collections::BTreeMap, fmt, fmt::Write as _, io::Write};

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    bodies::Body,
    constants::{Degree, SNAPSHOT_FILE_NAME, SUMMARY_FILE_NAME},
    cross_validation::ConsistencyReport,
    ephem_errors::EphemError,
    ephemeris::{EngineId, EphemerisResult},
    time::{epoch_iso, format_utc},
};

/// How much the snapshot can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Two precise backends agreed (see `consistency_score`).
    CrossValidated,
    /// A single precise backend answered.
    Single,
    /// Failsafe output.
    Reduced,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::CrossValidated => "cross_validated",
            Precision::Single => "single",
            Precision::Reduced => "reduced",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSnapshot {
    #[serde(with = "epoch_iso")]
    timestamp: Epoch,
    engine: EngineId,
    precision: Precision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    consistency_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    per_body_delta: Option<BTreeMap<Body, Degree>>,
    sources: Vec<EphemerisResult>,
}

impl EphemerisSnapshot {
    pub fn cross_validated(
        first: EphemerisResult,
        second: EphemerisResult,
        report: ConsistencyReport,
    ) -> Self {
        EphemerisSnapshot {
            timestamp: first.timestamp(),
            engine: EngineId::multi(),
            precision: Precision::CrossValidated,
            consistency_score: Some(report.aggregate_score()),
            per_body_delta: Some(report.per_body_delta().clone()),
            sources: vec![first, second],
        }
    }

    pub fn single(result: EphemerisResult) -> Self {
        let precision = if result.engine().is_failsafe() {
            Precision::Reduced
        } else {
            Precision::Single
        };
        EphemerisSnapshot {
            timestamp: result.timestamp(),
            engine: result.engine().clone(),
            precision,
            consistency_score: None,
            per_body_delta: None,
            sources: vec![result],
        }
    }

    pub fn timestamp(&self) -> Epoch {
        self.timestamp
    }

    pub fn engine(&self) -> &EngineId {
        &self.engine
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn consistency_score(&self) -> Option<f64> {
        self.consistency_score
    }

    pub fn per_body_delta(&self) -> Option<&BTreeMap<Body, Degree>> {
        self.per_body_delta.as_ref()
    }

    pub fn sources(&self) -> &[EphemerisResult] {
        &self.sources
    }

    /// Human readable report, one line per body and source.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        // writing to a String cannot fail
        let _ = writeln!(out, "Ephemeris snapshot {}", format_utc(self.timestamp));
        let _ = write!(out, "engine: {} | precision: {}", self.engine, self.precision);
        if let Some(score) = self.consistency_score {
            let _ = write!(out, " | consistency: {score:.3}");
        }
        out.push('\n');
        out.push_str(&"-".repeat(48));
        out.push('\n');

        for source in &self.sources {
            let _ = writeln!(out, "[{}]", source.engine());
            for (body, position) in source.bodies() {
                let _ = writeln!(
                    out,
                    "{body:8} | λ={:9.3}°  retro={}",
                    position.longitude_deg(),
                    if position.retrograde() { "Yes" } else { "No" }
                );
            }
        }
        out
    }
}

/// Writes snapshots and summaries into one output directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    directory: Utf8PathBuf,
}

impl SnapshotWriter {
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Self {
        SnapshotWriter {
            directory: directory.into(),
        }
    }

    pub fn snapshot_path(&self) -> Utf8PathBuf {
        self.directory.join(SNAPSHOT_FILE_NAME)
    }

    pub fn summary_path(&self) -> Utf8PathBuf {
        self.directory.join(SUMMARY_FILE_NAME)
    }

    /// Replace the snapshot and the summary.
    ///
    /// Return
    /// ----------
    /// * The snapshot path.
    ///
    /// Each file is swapped in with a rename, so a reader never sees a partial file. The
    /// snapshot goes first: if writing the summary fails, the new snapshot is already in
    /// place next to the previous summary.
    pub fn write(&self, snapshot: &EphemerisSnapshot) -> Result<Utf8PathBuf, EphemError> {
        std::fs::create_dir_all(&self.directory)?;

        let mut json = serde_json::to_vec_pretty(snapshot)?;
        json.push(b'\n');
        let snapshot_path = self.snapshot_path();
        write_atomic(&self.directory, &snapshot_path, &json)?;
        write_atomic(&self.directory, &self.summary_path(), snapshot.summary().as_bytes())?;

        Ok(snapshot_path)
    }
}

fn write_atomic(directory: &Utf8Path, path: &Utf8Path, bytes: &[u8]) -> Result<(), EphemError> {
    let mut tmp = NamedTempFile::new_in(directory)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| EphemError::PersistError {
        path: path.to_string(),
        reason: e.error.to_string(),
    })?;
    Ok(())
}

/// Read back a snapshot written by [`SnapshotWriter::write`].
pub fn load(path: &Utf8Path) -> Result<EphemerisSnapshot, EphemError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
