use std::collections::HashMap;

use camino::Utf8Path;
use nalgebra::Vector3;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_i32, le_u32},
    IResult,
};
use tracing::debug;

use crate::{
    constants::{Kilometer, JDTOMJD, MJD},
    ephem_errors::EphemError,
    probe::HORIZON_MIN_HEADER_BYTES,
};

use super::{
    horizon_ids::{HorizonID, POSITION_TABLES},
    horizon_records::HorizonRecord,
};

/// Sub-interval records of one data block, keyed by IPT table index.
type HorizonRecords = Vec<HashMap<usize, Vec<HorizonRecord>>>;

/// IPT table: for each of the 15 tables, `[offset, n_coeffs, n_subintervals]`.
pub type IPT = [[u32; 3]; 15];

const OLD_MAX_CONSTANTS: usize = 400;
const IPT_OFFSET: usize = 2696;
const START_400TH_CONSTANT_NAME: usize = 2856;

#[derive(Debug, PartialEq, Clone)]
pub struct HorizonHeader {
    jpl_version: String,
    ipt: IPT,
    start_period: f64,
    end_period: f64,
    period_length: f64,
    earth_moon_mass_ratio: f64,
}

/// A fully loaded legacy DE binary.
#[derive(Debug, Clone)]
pub struct HorizonData {
    header: HorizonHeader,
    records: HorizonRecords,
}

fn invalid(what: &str) -> impl Fn(nom::Err<nom::error::Error<&[u8]>>) -> EphemError + '_ {
    move |e| EphemError::InvalidEphemFile(format!("{what}: {e:?}"))
}

/// Size of one data record in bytes, from the IPT table; `None` when it overflows.
fn compute_recsize(ipt: &IPT) -> Option<usize> {
    let words = (0..15).try_fold(4usize, |words, i| {
        let [_, n_coeffs, n_subintervals] = ipt[i];
        let table = (2 * n_subintervals as usize)
            .checked_mul(n_coeffs as usize)?
            .checked_mul(HorizonID::dimension(i))?;
        words.checked_add(table)
    })?;
    words.checked_mul(4)
}

fn parse_char6(input: &[u8]) -> IResult<&[u8], String> {
    let (rest, raw) = take(6usize)(input)?;
    Ok((rest, String::from_utf8_lossy(raw).trim_end().to_string()))
}

/// TTL (14×3 CHAR*6) and CNAM (400 CHAR*6) blocks, skipped.
fn parse_titles_and_names(input: &[u8]) -> IResult<&[u8], ()> {
    let (input, _) = count(parse_char6, 14 * 3)(input)?;
    let (input, _) = count(parse_char6, OLD_MAX_CONSTANTS)(input)?;
    Ok((input, ()))
}

/// SS triple, NCON, AU (skipped) and EMRAT.
fn parse_span_and_constants(input: &[u8]) -> IResult<&[u8], ([f64; 3], i32, f64)> {
    let (input, ss) = count(le_f64, 3)(input)?;
    let (input, ncon) = le_i32(input)?;
    let (input, _au) = take(8usize)(input)?;
    let (input, emrat) = le_f64(input)?;
    Ok((input, ([ss[0], ss[1], ss[2]], ncon, emrat)))
}

fn parse_three(input: &[u8]) -> IResult<&[u8], [u32; 3]> {
    let (input, v) = count(le_u32, 3)(input)?;
    Ok((input, [v[0], v[1], v[2]]))
}

/// IPT rows 0..12, NUMDE, then LPT stored as row 12.
fn parse_ipt(input: &[u8]) -> IResult<&[u8], (IPT, u32)> {
    let mut ipt: IPT = [[0; 3]; 15];
    let mut input = input;
    for row in ipt.iter_mut().take(12) {
        let (rest, values) = parse_three(input)?;
        *row = values;
        input = rest;
    }
    let (input, numde) = le_u32(input)?;
    let (input, lpt) = parse_three(input)?;
    ipt[12] = lpt;
    Ok((input, (ipt, numde)))
}

/// IPT rows 13 and 14 are stored after the names of the constants beyond the 400th,
/// and only exist from DE440 on.
fn read_ipt_13_14(
    bytes: &[u8],
    ncon: i32,
    numde: u32,
) -> Result<Option<[[u32; 3]; 2]>, EphemError> {
    if numde < 440 || ncon <= OLD_MAX_CONSTANTS as i32 {
        return Ok(None);
    }

    let offset = START_400TH_CONSTANT_NAME + (ncon as usize - OLD_MAX_CONSTANTS) * 6;
    let slice = bytes
        .get(offset..)
        .ok_or_else(|| EphemError::InvalidEphemFile("truncated IPT[13..15]".into()))?;
    let (rest, ipt_13) = parse_three(slice).map_err(invalid("IPT[13]"))?;
    let (_, ipt_14) = parse_three(rest).map_err(invalid("IPT[14]"))?;
    Ok(Some([ipt_13, ipt_14]))
}

/// Split one data block into sub-interval records for every position table.
fn extract_block_records(
    block: &[f64],
    ipt: &IPT,
) -> Result<HashMap<usize, Vec<HorizonRecord>>, EphemError> {
    let (jd_start, jd_end) = (block[0], block[1]);
    let coeffs = &block[2..];

    POSITION_TABLES
        .iter()
        .map(|id| {
            let index = usize::from(*id);
            let [offset, n_coeffs, n_subs] = ipt[index];
            if n_coeffs == 0 {
                return Ok((index, Vec::new()));
            }
            let records = (0..n_subs as usize)
                .map(|sub| {
                    HorizonRecord::new(
                        jd_start,
                        jd_end,
                        coeffs,
                        offset as usize,
                        sub,
                        n_coeffs as usize,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((index, records))
        })
        .collect()
}

fn parse_all_blocks(bytes: &[u8], recsize: usize, ipt: &IPT) -> Result<HorizonRecords, EphemError> {
    let data = bytes
        .get(2 * recsize..)
        .ok_or_else(|| EphemError::InvalidEphemFile("no data record".into()))?;
    let n_values = recsize / 8;

    data.chunks_exact(recsize)
        .map(|chunk| {
            let (_, block) = count(le_f64, n_values)(chunk).map_err(invalid("data record"))?;
            extract_block_records(&block, ipt)
        })
        .collect()
}

impl HorizonData {
    /// Read and decode a legacy DE binary.
    ///
    /// Return
    /// ----------
    /// * The decoded file, or [`EphemError::InvalidEphemFile`] for a truncated or
    ///   inconsistent file. Nothing in here panics on malformed input.
    pub fn read_horizon_file(path: &Utf8Path) -> Result<Self, EphemError> {
        let bytes = std::fs::read(path)?;
        let data = HorizonData::from_bytes(&bytes)?;
        debug!(
            "loaded {} from {path}: {} records, JD {}..{}",
            data.header.jpl_version,
            data.records.len(),
            data.header.start_period,
            data.header.end_period
        );
        Ok(data)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EphemError> {
        if bytes.len() < HORIZON_MIN_HEADER_BYTES as usize {
            return Err(EphemError::InvalidEphemFile(format!(
                "header needs {HORIZON_MIN_HEADER_BYTES} bytes, file has {}",
                bytes.len()
            )));
        }

        let (input, _) = parse_titles_and_names(bytes).map_err(invalid("TTL/CNAM"))?;
        let (_, (ss, ncon, earth_moon_mass_ratio)) =
            parse_span_and_constants(input).map_err(invalid("SS/NCON/EMRAT"))?;
        let (_, (mut ipt, numde)) = parse_ipt(&bytes[IPT_OFFSET..]).map_err(invalid("IPT"))?;

        if let Some([ipt_13, ipt_14]) = read_ipt_13_14(bytes, ncon, numde)? {
            ipt[13] = ipt_13;
            ipt[14] = ipt_14;
        }

        let [start_period, end_period, period_length] = ss;
        if !(period_length > 0.0) || end_period <= start_period {
            return Err(EphemError::InvalidEphemFile(format!(
                "bad time span {start_period}..{end_period} step {period_length}"
            )));
        }

        let recsize = compute_recsize(&ipt)
            .ok_or_else(|| EphemError::InvalidEphemFile("IPT record size overflows".into()))?;
        if recsize <= 16 {
            return Err(EphemError::InvalidEphemFile("empty IPT table".into()));
        }
        if recsize.saturating_mul(3) > bytes.len() {
            return Err(EphemError::InvalidEphemFile(format!(
                "{} bytes cannot hold two header records and one data record of {recsize} bytes",
                bytes.len()
            )));
        }

        let records = parse_all_blocks(bytes, recsize, &ipt)?;
        if records.is_empty() {
            return Err(EphemError::InvalidEphemFile("no data record".into()));
        }

        Ok(HorizonData {
            header: HorizonHeader {
                jpl_version: format!("DE{numde}"),
                ipt,
                start_period,
                end_period,
                period_length,
                earth_moon_mass_ratio,
            },
            records,
        })
    }

    /// Label of the solution, e.g. `DE440`.
    pub fn version(&self) -> &str {
        &self.header.jpl_version
    }

    /// Covered span, in Julian Dates (TDB).
    pub fn coverage(&self) -> (f64, f64) {
        (self.header.start_period, self.header.end_period)
    }

    /// Index of the data record covering `et` and the normalized time inside it.
    fn get_record_index(&self, et: MJD) -> Result<(usize, f64), EphemError> {
        let (ephem_start, ephem_end, ephem_step) = (
            self.header.start_period,
            self.header.end_period,
            self.header.period_length,
        );

        let et_jd = JDTOMJD + et.trunc();
        let jd = JDTOMJD + et;
        let out_of_range = || {
            EphemError::EpochOutOfRange(format!(
                "MJD {et} outside {} JD {ephem_start}..{ephem_end}",
                self.header.jpl_version
            ))
        };

        if !(jd >= ephem_start && jd <= ephem_end) {
            return Err(out_of_range());
        }

        let mut nr = ((et_jd - ephem_start) / ephem_step).floor() as usize;
        if nr >= self.records.len() {
            nr = self.records.len() - 1;
            if jd - ephem_start > ephem_step * self.records.len() as f64 {
                return Err(out_of_range());
            }
        }

        let interval_start = (nr as f64) * ephem_step + ephem_start;
        let tau = ((et_jd - interval_start) + et.fract()) / ephem_step;
        Ok((nr, tau.clamp(0.0, 1.0)))
    }

    /// Raw position stored in table `id`, in km (barycentric, or geocentric for the Moon).
    fn table_position(&self, id: HorizonID, et: MJD) -> Result<Vector3<Kilometer>, EphemError> {
        let (nr, tau) = self.get_record_index(et)?;
        let index = usize::from(id);
        let n_subs = self.header.ipt[index][2] as usize;

        let sub_records = self.records[nr]
            .get(&index)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                EphemError::InvalidEphemFile(format!(
                    "{} has no coefficients for {id:?}",
                    self.header.jpl_version
                ))
            })?;

        let sub_index = ((tau * n_subs as f64).floor() as usize).min(n_subs - 1);
        Ok(sub_records[sub_index].interpolate(tau, n_subs))
    }

    /// Geocentric position of the body held in table `body`, ICRF axes, km.
    ///
    /// The Earth is recovered from the Earth-Moon barycenter and the geocentric Moon
    /// with the file's Earth/Moon mass ratio.
    pub fn geocentric_position(
        &self,
        body: HorizonID,
        et: MJD,
    ) -> Result<Vector3<Kilometer>, EphemError> {
        let moon = self.table_position(HorizonID::Moon, et)?;
        if body == HorizonID::Moon {
            return Ok(moon);
        }

        let emb = self.table_position(HorizonID::EarthMoonBarycenter, et)?;
        let earth = emb - moon / (1.0 + self.header.earth_moon_mass_ratio);
        Ok(self.table_position(body, et)? - earth)
    }
}
