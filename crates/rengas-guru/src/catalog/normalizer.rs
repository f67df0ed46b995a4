/// Strips byte-order and zero-width marks and collapses interior whitespace.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased form of [`normalize_text`] used for code and header comparisons.
pub(crate) fn normalize_code(value: &str) -> String {
    normalize_text(value).to_lowercase()
}

/// Header form matched against field names: `Noise Level` becomes `noise_level`.
pub(crate) fn normalize_header(value: &str) -> String {
    normalize_code(value).replace([' ', '-'], "_")
}
