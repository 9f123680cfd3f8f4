// ➗ Zero-fill policy
//
// Every derivation divides. A zero (or NaN) denominator, or a quotient that
// is not finite, yields DIVISION_BY_ZERO_FILL instead of a fault. The
// result is indistinguishable from a genuine zero ratio.

/// Value reported in place of an undefined ratio
pub const DIVISION_BY_ZERO_FILL: f64 = 0.0;

/// `numerator / denominator`, or the fill when that is undefined
pub fn ratio_or_fill(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || denominator.is_nan() {
        return DIVISION_BY_ZERO_FILL;
    }

    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        DIVISION_BY_ZERO_FILL
    }
}

/// Signed fractional change from `previous` to `current`
pub fn growth_or_fill(current: f64, previous: f64) -> f64 {
    ratio_or_fill(current - previous, previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_division() {
        assert_eq!(ratio_or_fill(20.0, 150.0), 20.0 / 150.0);
        assert_eq!(ratio_or_fill(-5.0, 2.0), -2.5);
    }

    #[test]
    fn test_zero_denominator_fills() {
        assert_eq!(ratio_or_fill(100.0, 0.0), DIVISION_BY_ZERO_FILL);
        assert_eq!(ratio_or_fill(0.0, 0.0), DIVISION_BY_ZERO_FILL);
        assert_eq!(ratio_or_fill(100.0, -0.0), DIVISION_BY_ZERO_FILL);
    }

    #[test]
    fn test_non_finite_fills() {
        assert_eq!(ratio_or_fill(f64::NAN, 10.0), DIVISION_BY_ZERO_FILL);
        assert_eq!(ratio_or_fill(1.0, f64::NAN), DIVISION_BY_ZERO_FILL);
        assert_eq!(ratio_or_fill(f64::MAX, f64::MIN_POSITIVE), DIVISION_BY_ZERO_FILL);
    }

    #[test]
    fn test_growth() {
        assert!((growth_or_fill(1200.0, 1000.0) - 0.2).abs() < 1e-12);
        assert!((growth_or_fill(800.0, 1000.0) + 0.2).abs() < 1e-12);
        assert_eq!(growth_or_fill(500.0, 0.0), DIVISION_BY_ZERO_FILL);
    }
}
