//! Fixed-point rendering for report figures.

/// Two decimal places, never `-0.00`.
pub(crate) fn fixed2(value: f64) -> String {
    let value = if value == 0.0 || !value.is_finite() { 0.0 } else { value };
    format!("{value:.2}")
}

/// `part / whole * 100` to two decimals; `"0.00"` when `whole` is not positive.
pub(crate) fn ratio_percent(part: f64, whole: f64) -> String {
    if whole > 0.0 {
        fixed2(part / whole * 100.0)
    } else {
        fixed2(0.0)
    }
}
