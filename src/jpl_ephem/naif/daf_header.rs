//! First record of a DAF container.
//!
//! Only the fields needed to walk the summaries are decoded: `ND`/`NI` size each summary,
//! `FWARD` points to the first summary record and `LOCFMT` tells the byte order of the
//! numeric data. The reserved area and the FTP validation string are skipped.

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

/// Size of one DAF record, in bytes.
pub const DAF_RECORD_BYTES: usize = 1 << 10;

#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    pub idword: String,
    pub internal_filename: String,
    pub nd: i32,
    pub ni: i32,
    pub fward: i32,
    pub bward: i32,
    pub free: i32,
    pub locfmt: String,
}

/// Fixed-width text field, padded with blanks or NUL bytes.
fn padded_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

impl DAFHeader {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, id_word) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        let (input, _reserved) = take(603usize)(input)?;
        let (input, _ftpstr) = take(28usize)(input)?;
        Ok((
            input,
            DAFHeader {
                idword: padded_text(id_word),
                internal_filename: padded_text(ifname),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: padded_text(locfmt),
            },
        ))
    }

    /// Doubles per summary: `ND + ceil(NI / 2)`.
    pub fn summary_size(&self) -> usize {
        self.nd.max(0) as usize + (self.ni.max(0) as usize).div_ceil(2)
    }

    /// Old kernels leave `LOCFMT` blank; those are treated as little-endian.
    pub fn is_little_endian(&self) -> bool {
        self.locfmt.is_empty() || self.locfmt == "LTL-IEEE"
    }
}
