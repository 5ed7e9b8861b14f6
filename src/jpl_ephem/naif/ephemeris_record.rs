//! Chebyshev records of type 2 and type 3 SPK segments.
//!
//! Each record is `rsize` little-endian doubles: the midpoint `mid` and half-length
//! `radius` of its interval (TDB seconds), then one block of `ncoeff` coefficients per
//! component. Type 2 stores X, Y, Z; type 3 adds the three velocity components, which
//! are not decoded here.

use nalgebra::Vector3;
use nom::{multi::count, number::complete::le_f64};

use crate::{constants::Kilometer, ephem_errors::EphemError};

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    pub mid: f64,
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl EphemerisRecord {
    /// Decode every record of a segment.
    ///
    /// Arguments
    /// -----------------
    /// * `bytes`: the whole kernel.
    /// * `initial_addr`: first word of the segment (1-based).
    /// * `rsize`: record size in words.
    /// * `n_records`: number of records.
    /// * `components`: coefficient blocks per record (3 for type 2, 6 for type 3).
    pub fn parse_segment(
        bytes: &[u8],
        initial_addr: usize,
        rsize: usize,
        n_records: usize,
        components: usize,
    ) -> Result<Vec<Self>, EphemError> {
        if initial_addr == 0 || rsize < 2 + components {
            return Err(EphemError::InvalidEphemFile(format!(
                "segment at word {initial_addr} with record size {rsize}"
            )));
        }
        let ncoeff = (rsize - 2) / components;
        let record_bytes = rsize.checked_mul(8);
        let span = record_bytes.and_then(|size| {
            let start = (initial_addr - 1).checked_mul(8)?;
            let end = n_records.checked_mul(size)?.checked_add(start)?;
            Some((size, start, end))
        });
        let past_end = || {
            EphemError::InvalidEphemFile(format!(
                "segment at word {initial_addr} ({n_records} records of {rsize} words) \
                 past end of file ({} bytes)",
                bytes.len()
            ))
        };
        let (record_bytes, start, end) = span.ok_or_else(past_end)?;
        let segment = bytes.get(start..end).ok_or_else(past_end)?;

        segment
            .chunks_exact(record_bytes)
            .map(|chunk| {
                let (_, words) = count(le_f64::<_, nom::error::Error<_>>, rsize)(chunk)
                    .map_err(|e| EphemError::InvalidEphemFile(format!("SPK record: {e:?}")))?;
                let coeffs = &words[2..];
                Ok(EphemerisRecord {
                    mid: words[0],
                    radius: words[1],
                    x: coeffs[..ncoeff].to_vec(),
                    y: coeffs[ncoeff..2 * ncoeff].to_vec(),
                    z: coeffs[2 * ncoeff..3 * ncoeff].to_vec(),
                })
            })
            .collect()
    }

    /// Position in km at `et_seconds`; the normalized time is clamped to \[-1, 1\].
    pub fn interpolate(&self, et_seconds: f64) -> Vector3<Kilometer> {
        let t = ((et_seconds - self.mid) / self.radius).clamp(-1.0, 1.0);

        let n = self.x.len().max(self.y.len()).max(self.z.len());
        let mut chebyshev = vec![0.0; n];
        if n > 0 {
            chebyshev[0] = 1.0;
        }
        if n > 1 {
            chebyshev[1] = t;
        }
        // T_n(t) = 2 t T_{n-1}(t) - T_{n-2}(t)
        for degree in 2..n {
            chebyshev[degree] = 2.0 * t * chebyshev[degree - 1] - chebyshev[degree - 2];
        }

        let eval =
            |coeffs: &[f64]| -> f64 { coeffs.iter().zip(&chebyshev).map(|(c, p)| c * p).sum() };
        Vector3::new(eval(&self.x), eval(&self.y), eval(&self.z))
    }
}

#[cfg(test)]
mod ephemeris_record_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn words_to_bytes(words: &[f64]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_parse_type2_segment() {
        // one padding word, then two records of rsize 8 (ncoeff 2)
        let mut words = vec![0.0];
        words.extend([10.0, 5.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        words.extend([20.0, 5.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let bytes = words_to_bytes(&words);

        let records = EphemerisRecord::parse_segment(&bytes, 2, 8, 2, 3).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].mid, 20.0);
        assert_eq!(records[1].x, vec![7.0, 8.0]);
        assert_eq!(records[1].z, vec![11.0, 12.0]);
    }

    #[test]
    fn test_parse_type3_keeps_positions() {
        // rsize 14: mid, radius, 6 blocks of 2 coefficients
        let mut words = vec![0.0, 1.0];
        words.extend((1..=12).map(|v| v as f64));
        let bytes = words_to_bytes(&words);
        let records = EphemerisRecord::parse_segment(&bytes, 1, 14, 1, 6).unwrap();
        assert_eq!(records[0].x, vec![1.0, 2.0]);
        assert_eq!(records[0].z, vec![5.0, 6.0]);
    }

    #[test]
    fn test_truncated_segment() {
        let bytes = words_to_bytes(&[0.0; 10]);
        assert!(EphemerisRecord::parse_segment(&bytes, 1, 8, 2, 3).is_err());
        assert!(EphemerisRecord::parse_segment(&bytes, 0, 8, 1, 3).is_err());
    }

    #[test]
    fn test_oversized_layout_is_an_error() {
        let bytes = words_to_bytes(&[0.0; 16]);
        let huge = [
            (1, usize::MAX, 1),
            (1, 8, usize::MAX),
            (usize::MAX, 8, 1),
            (1, usize::MAX / 4, 4),
        ];
        for (initial_addr, rsize, n_records) in huge {
            assert!(matches!(
                EphemerisRecord::parse_segment(&bytes, initial_addr, rsize, n_records, 3),
                Err(EphemError::InvalidEphemFile(_))
            ));
        }
    }

    #[test]
    fn test_interpolate() {
        let record = EphemerisRecord {
            mid: 100.0,
            radius: 50.0,
            x: vec![1.0, 2.0, 3.0],
            y: vec![-4.0, 0.5],
            z: vec![9.0],
        };
        // t = 0.5: T2 = -0.5
        let p = record.interpolate(125.0);
        assert_abs_diff_eq!(p.x, 1.0 + 1.0 - 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, -3.75, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 9.0, epsilon = 1e-12);

        // clamped past the end of the interval
        let q = record.interpolate(1e6);
        assert_abs_diff_eq!(q.x, 6.0, epsilon = 1e-12);
    }
}
