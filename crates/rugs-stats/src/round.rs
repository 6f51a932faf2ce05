//! Fixed decimal precision rounding.
//!
//! Output tables carry rounded values; all intermediate computation stays at full
//! precision and is rounded once when a row is built.

/// Precision used for prices and volatility figures.
pub const PRICE_DIGITS: u32 = 6;
/// Precision used for general ratios.
pub const RATIO_DIGITS: u32 = 4;
/// Precision used for per-tick ratios and game-level aggregate ratios.
pub const SHORT_RATIO_DIGITS: u32 = 3;

/// Rounds `value` to `digits` decimal places, half away from zero.
///
/// Non-finite values are returned unchanged.
///
/// # Examples
///
/// ```
/// use rugs_stats::round::round_to;
///
/// assert_eq!(round_to(2.5, 0), 3.0);
/// assert_eq!(round_to(-0.123_45, 3), -0.123);
/// assert_eq!(round_to(round_to(0.987_654, 3), 3), round_to(0.987_654, 3));
/// ```
#[expect(clippy::cast_possible_wrap)]
#[must_use]
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10_f64.powi(digits as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_is_idempotent() {
        let samples = [
            0.0,
            1.0,
            -1.5,
            0.333_333_333,
            2.345_678_912,
            1_234.567_890_123,
            -0.000_049_999,
            0.1 + 0.2,
            1e-9,
        ];
        for digits in [1, 2, 3, 4, 6] {
            for value in samples {
                let once = round_to(value, digits);
                assert_eq!(round_to(once, digits), once, "{value} @ {digits}");
            }
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(round_to(1.234_567_89, PRICE_DIGITS), 1.234_568);
        assert_eq!(round_to(0.666_66, RATIO_DIGITS), 0.6667);
        assert_eq!(round_to(0.1 + 0.2, SHORT_RATIO_DIGITS), 0.3);
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 3).is_nan());
        assert_eq!(round_to(f64::INFINITY, 3), f64::INFINITY);
        assert_eq!(round_to(f64::MAX, 6), f64::MAX);
    }
}
