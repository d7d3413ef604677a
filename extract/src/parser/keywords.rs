//! Payload extraction for separator and step lines.

use regex::Regex;
use std::sync::LazyLock;

/// Leading Gherkin keyword ending on a word boundary, followed by any run of
/// spaces, colons and commas.
///
/// Alternation is leftmost-first, so `dado que` is tried before `dado`.
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:dado que|dado|given|quando|when|então|entao|then)\b[\s:,]*")
        .expect("static regex must compile")
});

/// Strips a leading Gherkin keyword from a step line.
///
/// The remainder is kept verbatim: no re-capitalization, and a colon later
/// in the line is left alone. Lines without a keyword are only trimmed.
///
/// # Examples
///
/// ```
/// use casegen_extract::parser::clean_gherkin_keyword;
///
/// assert_eq!(clean_gherkin_keyword("Dado que o usuário está logado"), "o usuário está logado");
/// assert_eq!(clean_gherkin_keyword("Quando: clica no botão"), "clica no botão");
/// assert_eq!(clean_gherkin_keyword("THEN, sees: the total"), "sees: the total");
/// ```
pub fn clean_gherkin_keyword(line: &str) -> String {
    let trimmed = line.trim();
    match KEYWORD_RE.find(trimmed) {
        Some(found) => trimmed[found.end()..].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Text after the first colon, or the whole line when there is none.
pub fn extract_after_colon(line: &str) -> String {
    match line.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => line.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_keyword_wins_over_prefix() {
        assert_eq!(clean_gherkin_keyword("dado que X"), "X");
        assert_eq!(clean_gherkin_keyword("Dado X"), "X");
    }

    #[test]
    fn test_accented_keyword_is_case_insensitive() {
        assert_eq!(clean_gherkin_keyword("ENTÃO o pedido é criado"), "o pedido é criado");
        assert_eq!(clean_gherkin_keyword("Entao: ok"), "ok");
    }

    #[test]
    fn test_keyword_must_end_on_word_boundary() {
        assert_eq!(clean_gherkin_keyword("Dado queijo no carrinho"), "queijo no carrinho");
        assert_eq!(clean_gherkin_keyword("Whenever it rains"), "Whenever it rains");
        assert_eq!(clean_gherkin_keyword("Thence onward"), "Thence onward");
        assert_eq!(clean_gherkin_keyword("Então,ok"), "ok");
    }

    #[test]
    fn test_keyword_only_line_yields_empty() {
        assert_eq!(clean_gherkin_keyword("When:"), "");
    }

    #[test]
    fn test_no_keyword_is_trimmed_only() {
        assert_eq!(clean_gherkin_keyword("  e também  "), "e também");
    }

    #[test]
    fn test_extract_after_colon() {
        assert_eq!(extract_after_colon("Cenário: login: ok"), "login: ok");
        assert_eq!(extract_after_colon(" Cenário 1 "), "Cenário 1");
        assert_eq!(extract_after_colon("Requisito:"), "");
    }
}
