use nom::{
    number::complete::{le_f64, le_i32},
    IResult,
};

/// Descriptor of one SPK segment, as found in a DAF summary record (`ND = 2`, `NI = 6`).
///
/// Epochs are TDB seconds past J2000, addresses are 1-based double-precision words.
#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;
        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    pub fn covers(&self, et_seconds: f64) -> bool {
        et_seconds >= self.start_epoch && et_seconds <= self.end_epoch
    }
}

#[cfg(test)]
mod summary_record_test {
    use super::*;

    #[test]
    fn test_parse_summary() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-100.0f64).to_le_bytes());
        bytes.extend_from_slice(&100.0f64.to_le_bytes());
        for v in [301i32, 3, 1, 2, 641, 2000] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let (rest, summary) = Summary::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(summary.target, 301);
        assert_eq!(summary.center, 3);
        assert_eq!(summary.data_type, 2);
        assert_eq!((summary.initial_addr, summary.final_addr), (641, 2000));
        assert!(summary.covers(0.0));
        assert!(summary.covers(100.0));
        assert!(!summary.covers(100.5));
    }
}
