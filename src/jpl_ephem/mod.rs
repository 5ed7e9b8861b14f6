//! JPL kernel readers and the shared geocentric-to-ecliptic step.
//!
//! Both readers return geocentric positions in km on ICRF axes. The precise backends
//! turn them into ecliptic longitudes of date J2000 with [`ecliptic_longitude`].

use nalgebra::{Rotation3, Vector3};

use crate::{
    angle::normalize,
    constants::{Degree, Kilometer, OBLIQUITY_J2000_ARCSEC, RADSEC},
};

pub mod download_jpl_file;
pub mod horizon;
pub mod naif;

/// Rotation from the ICRF (equatorial J2000) axes to the ecliptic J2000 axes.
pub fn rot_equ_to_ecl() -> Rotation3<f64> {
    let eps = OBLIQUITY_J2000_ARCSEC * RADSEC;
    Rotation3::from_axis_angle(&Vector3::x_axis(), -eps)
}

/// Ecliptic longitude, in \[0, 360) degrees, of an equatorial position vector.
pub fn ecliptic_longitude(equatorial: &Vector3<Kilometer>) -> Degree {
    let ecliptic = rot_equ_to_ecl() * equatorial;
    normalize(ecliptic.y.atan2(ecliptic.x).to_degrees())
}

#[cfg(test)]
mod jpl_ephem_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equinox_and_solstice_directions() {
        assert_abs_diff_eq!(ecliptic_longitude(&Vector3::new(1.0, 0.0, 0.0)), 0.0);
        assert_abs_diff_eq!(ecliptic_longitude(&Vector3::new(-1.0, 0.0, 0.0)), 180.0);

        // the ecliptic pole seen from the equator
        let eps = OBLIQUITY_J2000_ARCSEC * RADSEC;
        let summer = Vector3::new(0.0, eps.cos(), eps.sin());
        assert_abs_diff_eq!(ecliptic_longitude(&summer), 90.0, epsilon = 1e-9);
        let winter = -summer;
        assert_abs_diff_eq!(ecliptic_longitude(&winter), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_keeps_x_axis() {
        let v = rot_equ_to_ecl() * Vector3::new(2.0, 0.0, 0.0);
        assert_abs_diff_eq!(v.x, 2.0);
        assert_abs_diff_eq!(v.y, 0.0);
    }
}
