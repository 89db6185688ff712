//! Two-decimal rounding shared by exports, logs and trade sizing.

/// Round half-up to 2 decimal places: `floor(value * 100 + 0.5) / 100`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}
