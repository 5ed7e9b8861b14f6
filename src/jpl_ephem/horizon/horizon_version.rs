//! DE solutions distributed as legacy binaries under JPL's `eph/planets/Linux/` tree.
//!
//! A [`JPLHorizonVersion`] maps a solution label (`DE440`) to the relative path of its legacy
//! binary (`de440/linux_p1550p2650.440`). The bare file name is what [`KernelProbe`](crate::probe::KernelProbe)
//! looks for in the ephemeris directory, the full fragment is what the downloader appends
//! to the server root.
//!
//! ```rust
//! use std::str::FromStr;
//! use senkron::jpl_ephem::horizon::horizon_version::JPLHorizonVersion;
//!
//! let v = JPLHorizonVersion::from_str("DE440").unwrap();
//! assert_eq!(v.get_filename(), "de440/linux_p1550p2650.440");
//! assert_eq!(v.legacy_file_name(), "linux_p1550p2650.440");
//! ```
use std::{fmt, str::FromStr};

use crate::ephem_errors::EphemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JPLHorizonVersion {
    DE405,
    DE406,
    DE421,
    DE422,
    DE430,
    DE430t,
    DE431,
    DE440,
    DE440t,
    DE441,
}

const ALL_VERSIONS: [JPLHorizonVersion; 10] = [
    JPLHorizonVersion::DE405,
    JPLHorizonVersion::DE406,
    JPLHorizonVersion::DE421,
    JPLHorizonVersion::DE422,
    JPLHorizonVersion::DE430,
    JPLHorizonVersion::DE430t,
    JPLHorizonVersion::DE431,
    JPLHorizonVersion::DE440,
    JPLHorizonVersion::DE440t,
    JPLHorizonVersion::DE441,
];

impl JPLHorizonVersion {
    /// Relative path of the legacy binary under the server's `Linux/` directory.
    pub fn get_filename(&self) -> &'static str {
        match self {
            JPLHorizonVersion::DE405 => "de405/lnxp1600p2200.405",
            JPLHorizonVersion::DE406 => "de406/lnxm3000p3000.406",
            JPLHorizonVersion::DE421 => "de421/lnxp1900p2053.421",
            JPLHorizonVersion::DE422 => "de422/lnxm3000p3000.422",
            JPLHorizonVersion::DE430 => "de430/linux_p1550p2650.430",
            JPLHorizonVersion::DE430t => "de430t/linux_p1550p2650.430t",
            JPLHorizonVersion::DE431 => "de431/lnxm13000p17000.431",
            JPLHorizonVersion::DE440 => "de440/linux_p1550p2650.440",
            JPLHorizonVersion::DE440t => "de440t/linux_p1550p2650.440t",
            JPLHorizonVersion::DE441 => "de441/linux_m13000p17000.441",
        }
    }

    /// File name of the legacy binary, without its version directory.
    pub fn legacy_file_name(&self) -> &'static str {
        let fragment = self.get_filename();
        fragment
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(fragment)
    }

    /// Recover the version from a legacy file name such as `lnxp1900p2053.421`.
    pub fn from_legacy_file_name(file_name: &str) -> Option<Self> {
        ALL_VERSIONS
            .iter()
            .find(|v| v.legacy_file_name() == file_name)
            .copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            JPLHorizonVersion::DE405 => "DE405",
            JPLHorizonVersion::DE406 => "DE406",
            JPLHorizonVersion::DE421 => "DE421",
            JPLHorizonVersion::DE422 => "DE422",
            JPLHorizonVersion::DE430 => "DE430",
            JPLHorizonVersion::DE430t => "DE430t",
            JPLHorizonVersion::DE431 => "DE431",
            JPLHorizonVersion::DE440 => "DE440",
            JPLHorizonVersion::DE440t => "DE440t",
            JPLHorizonVersion::DE441 => "DE441",
        }
    }
}

impl fmt::Display for JPLHorizonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for JPLHorizonVersion {
    type Err = EphemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_VERSIONS
            .iter()
            .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| EphemError::InvalidJPLEphemFileVersion(s.to_string()))
    }
}
