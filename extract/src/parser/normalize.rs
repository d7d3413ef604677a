//! Text normalization applied before line parsing.

/// Normalizes converter and file output into LF-separated text.
///
/// Strips a UTF-8 byte-order mark, folds CRLF and lone CR into LF, turns
/// form feeds (page breaks from PDF converters) into blank lines and
/// replaces non-breaking spaces with plain spaces.
///
/// # Examples
///
/// ```
/// use casegen_extract::parser::normalize_text;
///
/// assert_eq!(normalize_text("\u{feff}a\r\nb\u{c}c"), "a\nb\n\nc");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let without_bom = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    without_bom
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{c}', "\n\n")
        .replace('\u{a0}', " ")
}
