//! Rounding and number formatting shared by the pipeline steps and the text encoder.
//!
//! Every rounding in the crate goes through [`round_to`], which rounds half away from zero
//! (`123.45678` at 2 digits is `123.46`, `0.125` at 2 digits is `0.13`, `-2.5` at 0 digits is `-3`).

/// Round `v` to `digits` decimal places, ties away from zero.
pub fn round_to(v: f64, digits: u32) -> f64 {
    if !v.is_finite() {
        return v;
    }
    let scale = 10f64.powi(digits.min(15) as i32);
    let scaled = v * scale;
    // Products like 1.005 * 100 land within a few ulps of the tie; snap those onto it.
    let magnitude = scaled.abs();
    let nudged = if (magnitude.fract() - 0.5).abs() <= 4.0 * f64::EPSILON * magnitude.max(1.0) {
        scaled.signum() * (magnitude.trunc() + 0.5)
    } else {
        scaled
    };
    let out = nudged.round() / scale;
    if out == 0.0 { 0.0 } else { out }
}

/// Format as an integer after rounding (`12.5` -> `13`).
pub fn fmt_int(v: f64) -> String {
    format!("{}", round_to(v, 0) as i64)
}

/// Format with two decimals when the value has a fractional part, else with none.
///
/// `1.0` -> `1`, `0.5` -> `0.50`, `1.256` -> `1.26`.
pub fn fmt_fraction(v: f64) -> String {
    let rounded = round_to(v, 2);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.2}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
