mod solve;
mod spline;

use crate::C;
pub(crate) use spline::spline_weights;

/// Rounds `value` to `digits` decimal places, half away from zero.
pub(crate) fn round_to(value: C, digits: u32) -> C {
    let scale = (10.0 as C).powi(i32::try_from(digits).unwrap_or(i32::MAX));
    if scale.is_finite() {
        (value * scale).round() / scale
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(-0.0455, 2), -0.05);
        assert_eq!(round_to(1.0, 2), 1.0);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert!(round_to(f64::NAN, 3).is_nan());
    }
}
