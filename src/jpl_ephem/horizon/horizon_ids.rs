use crate::bodies::Body;

/// Index of a body table in the IPT header of a legacy DE binary.
///
/// Indices 0 to 10 hold barycentric positions, except [`HorizonID::Moon`] which is
/// geocentric and [`HorizonID::EarthMoonBarycenter`] which replaces the Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HorizonID {
    Mercury = 0,
    Venus = 1,
    EarthMoonBarycenter = 2,
    Mars = 3,
    Jupiter = 4,
    Saturn = 5,
    Uranus = 6,
    Neptune = 7,
    Pluto = 8,
    Moon = 9,
    Sun = 10,
    Nutation = 11,
    Libration = 12,
    MantleVelocity = 13,
    TTmTDB = 14,
}

/// Tables holding Cartesian positions, the only ones decoded from data records.
pub(crate) const POSITION_TABLES: [HorizonID; 11] = [
    HorizonID::Mercury,
    HorizonID::Venus,
    HorizonID::EarthMoonBarycenter,
    HorizonID::Mars,
    HorizonID::Jupiter,
    HorizonID::Saturn,
    HorizonID::Uranus,
    HorizonID::Neptune,
    HorizonID::Pluto,
    HorizonID::Moon,
    HorizonID::Sun,
];

impl HorizonID {
    /// Table holding `body`, if the DE binaries carry it.
    pub fn from_body(body: Body) -> Option<HorizonID> {
        match body {
            Body::Sun => Some(HorizonID::Sun),
            Body::Moon => Some(HorizonID::Moon),
            Body::Mercury => Some(HorizonID::Mercury),
            Body::Venus => Some(HorizonID::Venus),
            Body::Mars => Some(HorizonID::Mars),
            Body::Jupiter => Some(HorizonID::Jupiter),
            Body::Saturn => Some(HorizonID::Saturn),
            Body::Uranus => Some(HorizonID::Uranus),
            Body::Neptune => Some(HorizonID::Neptune),
            Body::Pluto => Some(HorizonID::Pluto),
            Body::Chiron | Body::Ceres | Body::Eris => None,
        }
    }

    /// Number of components stored per coefficient set.
    pub(crate) fn dimension(index: usize) -> usize {
        match index {
            0..=10 => 3,
            11 => 2,
            12 | 13 => 3,
            14 => 1,
            _ => 0,
        }
    }
}

impl From<HorizonID> for usize {
    fn from(id: HorizonID) -> Self {
        id as usize
    }
}

#[cfg(test)]
mod horizon_ids_test {
    use super::*;

    #[test]
    fn test_from_body() {
        assert_eq!(HorizonID::from_body(Body::Mars), Some(HorizonID::Mars));
        assert_eq!(usize::from(HorizonID::Moon), 9);
        assert_eq!(HorizonID::from_body(Body::Ceres), None);
        assert!(POSITION_TABLES
            .iter()
            .enumerate()
            .all(|(i, id)| usize::from(*id) == i));
    }
}
