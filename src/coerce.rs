//! String-to-value coercion for harness CSV cells.
//!
//! Every cell arrives as text. A cell that does not parse never fails the
//! analysis; it falls back to the default documented on each helper.

pub const UNKNOWN_LABEL: &str = "unknown";

/// `"true"` in any case is true; anything else (including empty) is false.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Finite float or `0.0`.
pub fn parse_float_or_zero(value: &str) -> f64 {
    parse_finite_float(value).unwrap_or(0.0)
}

pub fn parse_finite_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Hour error is only counted when the cell is a plain non-negative integer.
/// Empty cells, signs, decimals and overflow are all excluded rather than
/// treated as zero.
pub fn parse_hour_error(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    trimmed.parse::<u32>().ok()
}

pub fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
