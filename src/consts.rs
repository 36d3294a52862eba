// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.00001;

// Offset applied along the normal for over/under points
pub const SURFACE_OFFSET: f64 = 0.0001;

// Maximum recursion depth for reflection and refraction rays
pub const MAX_RECURSION_DEPTH: usize = 5;

// Default render parameters
pub const DEFAULT_TILE_SIZE: usize = 32;
pub const DEFAULT_FOCAL_SAMPLES: usize = 8;
pub const DEFAULT_MAX_FOCAL_SAMPLES: usize = 32;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.52;
pub const DIAMOND_RI: f64 = 2.417;

/// Approximate floating point equality.
///
/// Two NaNs compare equal here so that degenerate fixtures (e.g. the normal of
/// a zero-area triangle) can be asserted on. Intersection code never routes
/// `t` values through this function.
pub fn feq(left: f64, right: f64) -> bool {
    if left.is_nan() && right.is_nan() {
        return true;
    }

    (left - right).abs() < FEQ_EPSILON
}

#[test]
fn feq_within_epsilon() {
    assert!(feq(1.0, 1.000001));
    assert!(!feq(1.0, 1.0001));
}

#[test]
fn feq_nan_is_equal_to_nan() {
    assert!(feq(f64::NAN, f64::NAN));
    assert!(!feq(f64::NAN, 0.0));
}
