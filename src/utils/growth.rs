//! Growth and Difference Arithmetic
//!
//! Shared by the year-gap projector, the purchased-tonnes series and the
//! comparison row values.

/// Compound one year of growth onto `previous`
///
/// `growth_rate` is a percentage: 1.5 means +1.5% per year.
pub fn grow(previous: f64, growth_rate: f64) -> f64 {
    previous + previous * growth_rate / 100.0
}

/// Symmetric percent difference between a base and a compared value
///
/// `100 × (compared − base) / ((compared + base) / 2)`. When the two values
/// sum to zero the result is 0.0 instead of NaN/Infinity. A zero on one side
/// only gives ±200.
pub fn percentage_difference(base: f64, compared: f64) -> f64 {
    let mean = (compared + base) / 2.0;
    if mean == 0.0 {
        return 0.0;
    }
    100.0 * (compared - base) / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grow() {
        assert_relative_eq!(grow(30.0, 1.5), 30.45, epsilon = 1e-9);
        assert_relative_eq!(grow(0.0, 1.5), 0.0);
        assert_relative_eq!(grow(100.0, 0.0), 100.0);
    }

    #[test]
    fn test_percentage_difference_symmetry() {
        assert_relative_eq!(percentage_difference(10.0, 10.0), 0.0);
        // 100 * 10 / 15
        assert_relative_eq!(percentage_difference(10.0, 20.0), 66.666_666_666, epsilon = 1e-6);
        assert_relative_eq!(percentage_difference(20.0, 10.0), -66.666_666_666, epsilon = 1e-6);
    }

    #[test]
    fn test_percentage_difference_zero_sides() {
        // One side zero: the ±200% artifact
        assert_relative_eq!(percentage_difference(0.0, 20.0), 200.0);
        assert_relative_eq!(percentage_difference(20.0, 0.0), -200.0);
        // Zero denominator: sentinel, never NaN
        assert_eq!(percentage_difference(0.0, 0.0), 0.0);
        assert_eq!(percentage_difference(-5.0, 5.0), 0.0);
        assert!(percentage_difference(0.0, 0.0).is_finite());
    }
}
