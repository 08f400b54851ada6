/// Tolerance used when comparing boundaries that were rounded to milliseconds.
pub const TIME_EPSILON: f64 = 1e-6;

/// Round a time in seconds to millisecond precision.
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// True when two boundaries denote the same millisecond.
pub fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_EPSILON
}
