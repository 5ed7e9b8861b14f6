//! Degree arithmetic on the circle.
//!
//! Two pure helpers shared by every backend and by the cross validation:
//!
//! * [`normalize`] folds any finite angle into `[0, 360)`.
//! * [`signed_delta`] returns the shortest signed arc from `a` to `b`, in `(-180, 180]`.
//!
//! The shortest-arc convention is what makes `359°` and `1°` two degrees apart rather
//! than 358, both for retrograde detection and for backend comparison.

use crate::constants::{Degree, FULL_CIRCLE, HALF_CIRCLE};

/// Fold an angle into `[0, 360)`.
///
/// Arguments
/// -----------------
/// * `x`: Any finite angle in degrees.
///
/// Return
/// ----------
/// * The equivalent angle in `[0, 360)`. Negative zero is returned as `+0.0`, and a tiny
///   negative input whose shifted value rounds up to exactly `360.0` is returned as `0.0`.
///
/// Examples
/// ----------
/// ```rust
/// use senkron::angle::normalize;
///
/// assert_eq!(normalize(-90.0), 270.0);
/// assert_eq!(normalize(720.0), 0.0);
/// ```
pub fn normalize(x: Degree) -> Degree {
    let mut v = x % FULL_CIRCLE;
    if v < 0.0 {
        v += FULL_CIRCLE;
    }
    if v >= FULL_CIRCLE {
        return 0.0;
    }
    // -0.0 + 0.0 == +0.0
    v + 0.0
}

/// Shortest signed arc going from `a` to `b`.
///
/// Arguments
/// -----------------
/// * `a`: Start angle in degrees.
/// * `b`: End angle in degrees.
///
/// Return
/// ----------
/// * `b - a` folded into `(-180, 180]`. Positive means `b` lies ahead of `a` in the
///   direction of increasing longitude.
///
/// Examples
/// ----------
/// ```rust
/// use senkron::angle::signed_delta;
///
/// assert_eq!(signed_delta(359.0, 1.0), 2.0);
/// assert_eq!(signed_delta(1.0, 359.0), -2.0);
/// ```
pub fn signed_delta(a: Degree, b: Degree) -> Degree {
    let d = normalize(b - a);
    if d > HALF_CIRCLE {
        d - FULL_CIRCLE
    } else {
        d
    }
}
