use super::*;

#[test]
fn divisor_is_clamped_to_one_ms() {
    assert_eq!(divisor_ms(0.0), 1.0);
    assert_eq!(divisor_ms(-5.0), 1.0);
    assert_eq!(divisor_ms(f64::NAN), 1.0);
    assert_eq!(divisor_ms(250.0), 250.0);
}

#[test]
fn zero_duration_window_is_instant() {
    assert_eq!(window_progress(0.0, 0.0), 1.0);
    assert_eq!(window_progress(-1.0, 0.0), 0.0);
    assert_eq!(window_progress(50.0, 100.0), 0.5);
    assert_eq!(window_progress(500.0, 100.0), 1.0);
}

#[test]
fn clamp01_maps_nan_to_zero() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(1.5), 1.0);
}

#[test]
fn lerp_point_clamps_parameter() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 20.0);
    assert_eq!(lerp_point(a, b, 0.5), Point::new(5.0, 10.0));
    assert_eq!(lerp_point(a, b, 3.0), b);
}
