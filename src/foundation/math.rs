use kurbo::Point;

pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Durations used as divisors never drop below one millisecond.
pub(crate) fn divisor_ms(ms: f64) -> f64 {
    if ms.is_finite() { ms.max(1.0) } else { 1.0 }
}

/// Progress of `elapsed` through a window of `duration` ms; a zero duration is instant.
pub(crate) fn window_progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return if elapsed >= 0.0 { 1.0 } else { 0.0 };
    }
    clamp01(elapsed / divisor_ms(duration))
}

pub(crate) fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, clamp01(t))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
