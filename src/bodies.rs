//! The closed set of tracked bodies.
//!
//! Every backend reports longitudes keyed by [`Body`]. Two fixed lists are available through
//! [`BodySet`]: the seven classical bodies and the extended list that adds the outer planets,
//! Pluto and three minor bodies.
//!
//! Bodies are ordered (`Ord`) by their declaration order, which is also the order in which
//! results are serialized and printed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ephem_errors::EphemError;

/// A body whose geocentric ecliptic longitude is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    Ceres,
    Eris,
}

const CLASSICAL: [Body; 7] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
];

const EXTENDED: [Body; 13] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
    Body::Chiron,
    Body::Ceres,
    Body::Eris,
];

impl Body {
    /// Canonical name, as written in snapshots and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Chiron => "Chiron",
            Body::Ceres => "Ceres",
            Body::Eris => "Eris",
        }
    }

    /// Every body, in declaration order.
    pub fn all() -> &'static [Body] {
        &EXTENDED
    }

    /// NAIF integer code of the body (barycenter for the outer planets and Pluto,
    /// as found in the DE planetary kernels).
    pub fn naif_id(&self) -> i32 {
        match self {
            Body::Sun => 10,
            Body::Moon => 301,
            Body::Mercury => 1,
            Body::Venus => 2,
            Body::Mars => 4,
            Body::Jupiter => 5,
            Body::Saturn => 6,
            Body::Uranus => 7,
            Body::Neptune => 8,
            Body::Pluto => 9,
            Body::Chiron => 2_002_060,
            Body::Ceres => 2_000_001,
            Body::Eris => 2_136_199,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Padding flags (`{:8}`) are honoured, the summary report relies on them.
        f.pad(self.name())
    }
}

impl FromStr for Body {
    type Err = EphemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Body::all()
            .iter()
            .find(|body| body.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| EphemError::UnknownBody(s.to_string()))
    }
}

/// Which fixed list of bodies a run tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySet {
    /// Sun, Moon, Mercury, Venus, Mars, Jupiter, Saturn
    #[default]
    Classical,
    /// Classical set plus Uranus, Neptune, Pluto, Chiron, Ceres, Eris
    Extended,
}

impl BodySet {
    pub fn bodies(&self) -> &'static [Body] {
        match self {
            BodySet::Classical => &CLASSICAL,
            BodySet::Extended => &EXTENDED,
        }
    }
}
