use nalgebra::Vector3;

use crate::ephem_errors::EphemError;

/// Chebyshev coefficients of one body over one sub-interval of a DE data record.
///
/// Fields
/// --------
/// * `start_jd`, `end_jd`: Julian Dates (TDB) bounding the parent data record.
/// * `x`, `y`, `z`: coefficients of each Cartesian component, in km.
#[derive(Debug, PartialEq, Clone)]
pub struct HorizonRecord {
    pub start_jd: f64,
    pub end_jd: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl HorizonRecord {
    /// Extract one sub-interval from the coefficients of a data record.
    ///
    /// Arguments
    /// -----------------
    /// * `start_jd`, `end_jd`: bounds of the data record.
    /// * `coeffs`: the record without its two leading Julian Dates.
    /// * `offset`: 1-based IPT offset of the body, counted from the record start.
    /// * `sub_interval`: index of the sub-interval to extract.
    /// * `n_coeffs`: coefficients per component.
    ///
    /// Return
    /// ----------
    /// * The record, or [`EphemError::InvalidEphemFile`] when the IPT entry points
    ///   outside the data record.
    pub fn new(
        start_jd: f64,
        end_jd: f64,
        coeffs: &[f64],
        offset: usize,
        sub_interval: usize,
        n_coeffs: usize,
    ) -> Result<Self, EphemError> {
        let span = offset.checked_sub(3).and_then(|first| {
            let len = n_coeffs.checked_mul(3)?;
            let base = sub_interval.checked_mul(len)?.checked_add(first)?;
            Some((base, base.checked_add(len)?))
        });
        let block = span
            .and_then(|(base, end)| coeffs.get(base..end))
            .ok_or_else(|| {
                EphemError::InvalidEphemFile(format!(
                    "sub-interval {sub_interval} of {n_coeffs} coefficients at IPT offset {offset} \
                     outside a record of {} values",
                    coeffs.len()
                ))
            })?;

        Ok(HorizonRecord {
            start_jd,
            end_jd,
            x: block[..n_coeffs].to_vec(),
            y: block[n_coeffs..2 * n_coeffs].to_vec(),
            z: block[2 * n_coeffs..].to_vec(),
        })
    }

    /// Position of the body, in km, at normalized time `tau` of the parent record.
    ///
    /// `tau` is in \[0, 1\] over the whole data record; it is mapped to the Chebyshev
    /// argument of this sub-interval using `n_subintervals`.
    pub fn interpolate(&self, tau: f64, n_subintervals: usize) -> Vector3<f64> {
        let dt1 = tau.trunc();
        let temp = n_subintervals as f64 * tau;
        let tc = 2.0 * (temp.rem_euclid(1.0) + dt1) - 1.0;

        let n_coeff = self.x.len().max(self.y.len()).max(self.z.len());
        let mut tcheb = vec![0.0; n_coeff];
        if n_coeff > 0 {
            tcheb[0] = 1.0;
        }
        if n_coeff > 1 {
            tcheb[1] = tc;
        }
        for i in 2..n_coeff {
            tcheb[i] = 2.0 * tc * tcheb[i - 1] - tcheb[i - 2];
        }

        let eval = |coeffs: &[f64]| -> f64 { coeffs.iter().zip(&tcheb).map(|(c, t)| c * t).sum() };

        Vector3::new(eval(&self.x), eval(&self.y), eval(&self.z))
    }
}

#[cfg(test)]
mod horizon_records_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let coeffs = vec![0.0; 5];
        assert!(HorizonRecord::new(0.0, 32.0, &coeffs, 3, 0, 2).is_err());
        assert!(HorizonRecord::new(0.0, 32.0, &coeffs, 1, 0, 1).is_err());
        assert!(HorizonRecord::new(0.0, 32.0, &coeffs, 3, usize::MAX, 2).is_err());
        assert!(HorizonRecord::new(0.0, 32.0, &coeffs, usize::MAX, 0, 1).is_err());
        assert!(HorizonRecord::new(0.0, 32.0, &coeffs, 3, 1, usize::MAX).is_err());
    }

    #[test]
    fn test_sub_interval_layout() {
        // two sub-intervals, two coefficients per component
        let coeffs: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let second = HorizonRecord::new(0.0, 32.0, &coeffs, 3, 1, 2).unwrap();
        assert_eq!(second.x, vec![6.0, 7.0]);
        assert_eq!(second.y, vec![8.0, 9.0]);
        assert_eq!(second.z, vec![10.0, 11.0]);
    }

    #[test]
    fn test_interpolate_linear() {
        let record = HorizonRecord {
            start_jd: 0.0,
            end_jd: 32.0,
            x: vec![1.0, 2.0],
            y: vec![0.0, -1.0],
            z: vec![5.0, 0.0, 0.5],
        };
        // tau = 0.25 with one sub-interval: tc = -0.5, T2(-0.5) = -0.5
        let p = record.interpolate(0.25, 1);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 4.75, epsilon = 1e-12);

        // end of the record maps to tc = 1
        let end = record.interpolate(1.0, 1);
        assert_abs_diff_eq!(end.x, 3.0, epsilon = 1e-12);
    }
}
