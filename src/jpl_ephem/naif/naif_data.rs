//! Loader and position queries for NAIF SPK kernels.
//!
//! The kernel is read once: the DAF header gives the summary layout, the linked list of
//! summary records gives every segment, and the segment footers give the record layout.
//! All Chebyshev records of type 2 and type 3 segments are then decoded into memory;
//! segments of other types are skipped.
//!
//! Positions are relative to the segment center. [`NaifData::barycentric_position`]
//! follows the chain of centers down to the solar system barycenter, e.g.
//! Moon (301) → Earth-Moon barycenter (3) → SSB (0), or Ceres (2000001) → Sun (10) → SSB.
//!
//! # Units & time scales
//! * Epochs are TDB seconds past J2000.
//! * Positions are km, ICRF axes.

use std::collections::HashMap;

use camino::Utf8Path;
use nalgebra::Vector3;
use nom::{bytes::complete::take, number::complete::le_f64, IResult};
use tracing::debug;

use crate::{
    constants::{EphemerisSeconds, Kilometer},
    ephem_errors::EphemError,
};

use super::{
    daf_header::{DAFHeader, DAF_RECORD_BYTES},
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    summary_record::Summary,
};

pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
pub const EARTH: i32 = 399;

/// Longest center chain followed before the kernel is declared inconsistent.
const MAX_CHAIN_DEPTH: usize = 8;

#[derive(Debug, Clone)]
struct Segment {
    summary: Summary,
    directory: DirectoryData,
    records: Vec<EphemerisRecord>,
}

#[derive(Debug, Clone)]
pub struct NaifData {
    daf_header: DAFHeader,
    segments: HashMap<i32, Vec<Segment>>,
}

/// Control words of a summary record: next, previous, number of summaries.
fn parse_control_words(input: &[u8]) -> IResult<&[u8], (f64, f64)> {
    let (input, next) = le_f64(input)?;
    let (input, _prev) = take(8usize)(input)?;
    let (input, nsum) = le_f64(input)?;
    Ok((input, (next, nsum)))
}

fn invalid(reason: impl std::fmt::Display) -> EphemError {
    EphemError::InvalidEphemFile(reason.to_string())
}

impl NaifData {
    pub fn read_naif_file(path: &Utf8Path) -> Result<Self, EphemError> {
        let bytes = std::fs::read(path)?;
        let data = NaifData::from_bytes(&bytes)?;
        debug!(
            "loaded SPK {path} ({}): {} targets",
            data.daf_header.internal_filename,
            data.segments.len()
        );
        Ok(data)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EphemError> {
        let (_, daf_header) =
            DAFHeader::parse(bytes).map_err(|e| invalid(format!("DAF header: {e:?}")))?;

        if !daf_header.idword.starts_with("DAF/SPK") {
            return Err(invalid(format!("not an SPK kernel: {}", daf_header.idword)));
        }
        if !daf_header.is_little_endian() {
            return Err(invalid(format!("unsupported byte order {}", daf_header.locfmt)));
        }
        if daf_header.nd != 2 || daf_header.ni != 6 {
            return Err(invalid(format!(
                "SPK summaries need ND=2, NI=6, got ND={}, NI={}",
                daf_header.nd, daf_header.ni
            )));
        }

        let summary_bytes = daf_header.summary_size() * 8;
        let mut segments: HashMap<i32, Vec<Segment>> = HashMap::new();
        let mut record_number = daf_header.fward;
        let mut visited = 0usize;

        while record_number > 0 {
            visited += 1;
            if visited > bytes.len() / DAF_RECORD_BYTES {
                return Err(invalid("summary record list does not terminate"));
            }

            let record = (record_number as usize - 1)
                .checked_mul(DAF_RECORD_BYTES)
                .and_then(|offset| bytes.get(offset..offset.checked_add(DAF_RECORD_BYTES)?))
                .ok_or_else(|| {
                    invalid(format!("summary record {record_number} past end of file"))
                })?;

            let (summaries, (next, nsum)) = parse_control_words(record)
                .map_err(|e| invalid(format!("summary control words: {e:?}")))?;

            let max_summaries = (DAF_RECORD_BYTES - 24) / summary_bytes;
            if !(nsum >= 0.0 && nsum <= max_summaries as f64) {
                return Err(invalid(format!("{nsum} summaries do not fit a record")));
            }
            let nsum = nsum as usize;

            for chunk in summaries.chunks_exact(summary_bytes).take(nsum) {
                let (_, summary) =
                    Summary::parse(chunk).map_err(|e| invalid(format!("summary: {e:?}")))?;

                let components = match summary.data_type {
                    2 => 3,
                    3 => 6,
                    other => {
                        debug!(
                            "skipping SPK segment {} -> {} of type {other}",
                            summary.target, summary.center
                        );
                        continue;
                    }
                };

                let directory = DirectoryData::parse(bytes, summary.final_addr.max(0) as usize)?;
                let records = EphemerisRecord::parse_segment(
                    bytes,
                    summary.initial_addr.max(0) as usize,
                    directory.rsize,
                    directory.n_records,
                    components,
                )?;

                segments.entry(summary.target).or_default().push(Segment {
                    summary,
                    directory,
                    records,
                });
            }

            record_number = next as i32;
        }

        if segments.is_empty() {
            return Err(invalid("no usable SPK segment"));
        }

        Ok(NaifData {
            daf_header,
            segments,
        })
    }

    pub fn internal_name(&self) -> &str {
        &self.daf_header.internal_filename
    }

    /// Every NAIF id with at least one usable segment, sorted.
    pub fn targets(&self) -> Vec<i32> {
        let mut targets: Vec<i32> = self.segments.keys().copied().collect();
        targets.sort_unstable();
        targets
    }

    /// Segment for `target` covering `et`. Later segments take precedence, as in SPICE.
    fn segment_for(&self, target: i32, et: EphemerisSeconds) -> Result<&Segment, EphemError> {
        let candidates = self.segments.get(&target).ok_or(EphemError::SegmentNotFound {
            target,
            et_seconds: et,
        })?;

        candidates
            .iter()
            .rev()
            .find(|segment| segment.summary.covers(et))
            .ok_or_else(|| {
                EphemError::EpochOutOfRange(format!(
                    "ET {et} s outside every segment of NAIF id {target}"
                ))
            })
    }

    /// Position of `target` relative to its segment center, and that center.
    fn relative_position(
        &self,
        target: i32,
        et: EphemerisSeconds,
    ) -> Result<(Vector3<Kilometer>, i32), EphemError> {
        let segment = self.segment_for(target, et)?;
        let record = &segment.records[segment.directory.record_index(et)];
        Ok((record.interpolate(et), segment.summary.center))
    }

    /// Position of `target` relative to the solar system barycenter.
    pub fn barycentric_position(
        &self,
        target: i32,
        et: EphemerisSeconds,
    ) -> Result<Vector3<Kilometer>, EphemError> {
        let mut position = Vector3::zeros();
        let mut current = target;

        for _ in 0..MAX_CHAIN_DEPTH {
            if current == SOLAR_SYSTEM_BARYCENTER {
                return Ok(position);
            }
            let (relative, center) = self.relative_position(current, et)?;
            position += relative;
            current = center;
        }

        Err(invalid(format!(
            "center chain of NAIF id {target} deeper than {MAX_CHAIN_DEPTH}"
        )))
    }

    /// Position of `target` relative to the Earth (399).
    pub fn geocentric_position(
        &self,
        target: i32,
        et: EphemerisSeconds,
    ) -> Result<Vector3<Kilometer>, EphemError> {
        Ok(self.barycentric_position(target, et)? - self.barycentric_position(EARTH, et)?)
    }
}
