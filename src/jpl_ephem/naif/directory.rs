//! Four-word footer closing every type 2 and type 3 SPK segment.
//!
//! * `init`: start epoch of the first record (TDB seconds past J2000),
//! * `intlen`: time span covered by each record (seconds),
//! * `rsize`: record size in double-precision words,
//! * `n_records`: number of records in the segment.
//!
//! The footer occupies the words `final_addr - 3 ..= final_addr`.

use nom::{multi::count, number::complete::le_f64};

use crate::ephem_errors::EphemError;

#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    /// Arguments
    /// -----------------
    /// * `bytes`: the whole kernel.
    /// * `final_addr`: last word of the segment, from its
    ///   [`Summary`](super::summary_record::Summary).
    pub fn parse(bytes: &[u8], final_addr: usize) -> Result<Self, EphemError> {
        let start = final_addr.checked_sub(4).map(|words| words * 8).ok_or_else(|| {
            EphemError::InvalidEphemFile(format!("segment end address {final_addr}"))
        })?;
        let footer = bytes.get(start..start + 32).ok_or_else(|| {
            EphemError::InvalidEphemFile(format!(
                "segment directory at byte {start} past end of file"
            ))
        })?;

        let (_, values) = count(le_f64::<_, nom::error::Error<_>>, 4)(footer)
            .map_err(|e| EphemError::InvalidEphemFile(format!("segment directory: {e:?}")))?;
        let [init, intlen, rsize, n_records] = [values[0], values[1], values[2], values[3]];

        if !(intlen > 0.0) || !(rsize >= 3.0) || !(n_records >= 1.0) {
            return Err(EphemError::InvalidEphemFile(format!(
                "segment directory intlen={intlen} rsize={rsize} n={n_records}"
            )));
        }

        Ok(DirectoryData {
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        })
    }

    /// Index of the record covering `et_seconds`, clamped to the segment.
    pub fn record_index(&self, et_seconds: f64) -> usize {
        let idx = ((et_seconds - self.init) / self.intlen).floor().max(0.0) as usize;
        idx.min(self.n_records - 1)
    }
}
