//! Unit conversions and derived quantities used by the met plot.

/// Convert degrees Celsius to degrees Fahrenheit.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert degrees Fahrenheit to degrees Celsius.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Broadband albedo from the pyranometer pair: reflected over incoming.
///
/// Returns `None` when either reading is missing, non-finite, or the
/// incoming flux is zero (night-time hourly rows).
pub fn albedo(py_down: Option<f64>, py_up: Option<f64>) -> Option<f64> {
    match (py_down, py_up) {
        (Some(down), Some(up)) if up != 0.0 && down.is_finite() && up.is_finite() => {
            Some(down / up)
        }
        _ => None,
    }
}

/// Clamp to the physically valid reflectance range [0, 1].
pub fn clip_albedo(a: f64) -> f64 {
    a.clamp(0.0, 1.0)
}

/// "100% - albedo": the absorbed fraction as a percentage, after clipping.
pub fn inverted_albedo_percent(a: f64) -> f64 {
    (1.0 - clip_albedo(a)) * 100.0
}
