//! Rounding and denominator guards shared by the calculators

/// Smallest denominator used anywhere a threshold, bottleneck, or
/// availability factor could otherwise reach zero
pub const EPSILON: f64 = 1e-6;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Round to two decimals (display resolution for seconds and scores)
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Floor a denominator at [`EPSILON`]
pub fn floor_denominator(value: f64) -> f64 {
    value.max(EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(4200.0), 4200.0);
    }

    #[test]
    fn test_round_to_one_place() {
        assert_eq!(round_to(56.666_666, 1), 56.7);
    }

    #[test]
    fn test_floor_denominator() {
        assert_eq!(floor_denominator(0.0), EPSILON);
        assert_eq!(floor_denominator(-3.0), EPSILON);
        assert_eq!(floor_denominator(0.5), 0.5);
    }
}
