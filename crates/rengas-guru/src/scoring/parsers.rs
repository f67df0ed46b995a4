//! Field parsers turning raw catalog attributes into comparable numbers.
//!
//! None of these fail: malformed input and absent input both come back as
//! "no value" (`None`), or as 0 for letter grades.

use crate::catalog::RawField;
use crate::config::{GradeTable, NoiseRange};

/// Decibel reading from a number, `"72 dB"`, or a compound `"72/70 dB"`.
///
/// Only the text before the first slash is read; everything except digits and
/// `.` is dropped. Readings outside `range` are treated as missing.
pub fn parse_noise_level(raw: Option<&RawField>, range: &NoiseRange) -> Option<f64> {
    let decibels = match raw? {
        RawField::Number(value) => *value,
        RawField::Text(text) => {
            let leading = text.split('/').next().unwrap_or_default();
            let digits: String = leading
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse::<f64>().ok()?
        }
    };

    (decibels.is_finite() && range.contains(decibels)).then_some(decibels)
}

/// Ordinal for a single letter grade; unknown or absent grades decode to 0.
///
/// The worst grade and a missing grade are indistinguishable afterwards.
pub fn decode_grade(raw: Option<&str>, table: &GradeTable) -> u8 {
    let Some(raw) = raw else {
        return 0;
    };

    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(grade), None) => table.ordinal(grade).unwrap_or(0),
        _ => 0,
    }
}

/// Strictly positive finite number, or no value.
pub fn coerce_positive(raw: Option<&RawField>) -> Option<f64> {
    raw?.as_number()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Whole-star user rating. Keeps the leading integer (`"4.5"` reads as 4).
pub fn coerce_rating(raw: Option<&RawField>) -> Option<f64> {
    let rating = match raw? {
        RawField::Number(value) if value.is_finite() => value.trunc(),
        RawField::Number(_) => return None,
        RawField::Text(text) => leading_integer(text)? as f64,
    };

    (rating > 0.0).then_some(rating)
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digit_len = trimmed[sign_len..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digit_len == 0 {
        return None;
    }
    trimmed[..sign_len + digit_len].parse().ok()
}
