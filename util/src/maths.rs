//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Absolute tolerance used by [`nearly_eq`].
pub const FLOAT_EQ_TOLERANCE: f64 = 1.0e-6;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Bound an angle (in radians) into the range [0, 2pi).
///
/// Correct for angles any number of revolutions outside the range, not just one, since headings
/// integrated over a long run accumulate without bound. The revolution count is floored rather
/// than truncated, truncation towards zero gives the wrong representative for negative angles.
/// Inputs a fraction of an ulp below a multiple of 2pi round onto 2pi itself, those come back
/// as 0.
pub fn bound_to_2pi<T>(angle: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let revs = (angle / tau_t).floor();

    let bounded = angle - revs * tau_t;

    // The subtraction can round up to exactly 2pi, which is outside the half-open range
    if bounded == tau_t {
        T::zero()
    }
    else {
        bounded
    }
}

/// Return true if two values are equal to within [`FLOAT_EQ_TOLERANCE`].
///
/// The tolerance is absolute, not relative, so this is only suitable for quantities whose
/// magnitude is of order one or below, like per-cycle wheel travel.
pub fn nearly_eq<T>(a: T, b: T) -> bool
where
    T: Float
{
    (a - b).abs() < T::from(FLOAT_EQ_TOLERANCE).unwrap()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bound_to_2pi() {
        const TAU: f64 = std::f64::consts::TAU;

        assert_eq!(bound_to_2pi(0f64), 0f64);
        assert_eq!(bound_to_2pi(1f64), 1f64);
        assert_eq!(bound_to_2pi(TAU), 0f64);
        assert_eq!(bound_to_2pi(-TAU), 0f64);
        assert_eq!(bound_to_2pi(-1f64), TAU - 1f64);
        assert!((bound_to_2pi(7f64) - (7f64 - TAU)).abs() < 1e-12);

        // Many revolutions out
        assert!((bound_to_2pi(10f64 * TAU + 1f64) - 1f64).abs() < 1e-9);
        assert!((bound_to_2pi(-10f64 * TAU - 1f64) - (TAU - 1f64)).abs() < 1e-9);

        // A sub-ulp step below zero rounds onto the revolution boundary, and must come back as
        // 0 rather than 2pi
        assert_eq!(bound_to_2pi(-1e-18), 0f64);
    }

    #[test]
    fn test_bound_to_2pi_range_and_congruence() {
        const TAU: f64 = std::f64::consts::TAU;

        for i in -20..=20 {
            let angle = i as f64 * 0.7;
            let bounded = bound_to_2pi(angle);

            assert!(
                bounded >= 0f64 && bounded < TAU,
                "bound_to_2pi({}) = {} out of range",
                angle,
                bounded
            );

            // The removed amount must be a whole number of revolutions
            let revs = (angle - bounded) / TAU;
            assert!((revs - revs.round()).abs() < 1e-9);
        }

        // Negatives within an ulp of a multiple of 2pi still satisfy the range property
        for &angle in [-1e-18, -1e-15, -1e-12].iter() {
            let bounded = bound_to_2pi(angle);
            assert!(
                bounded >= 0f64 && bounded < TAU,
                "bound_to_2pi({}) = {} out of range",
                angle,
                bounded
            );
        }
    }

    #[test]
    fn test_nearly_eq() {
        assert!(nearly_eq(1f64, 1f64));
        assert!(nearly_eq(1f64, 1f64 + 1e-9));
        assert!(nearly_eq(0f64, -1e-7));
        assert!(!nearly_eq(1f64, 1.1f64));
        assert!(!nearly_eq(-1e-4, 1e-4));

        // Tolerance bound is exclusive
        assert!(!nearly_eq(0f64, 1e-6));
    }
}
