//! Line classification with an explicit ordered rule list.
//!
//! Each non-blank line is tested against [`RULES`] in order and takes the
//! kind of the first rule that matches. Matching is done on the lowercase
//! form of the trimmed line.

use casegen_core::CaseField;

/// Markers that always open a new requirement.
const REQUIREMENT_MARKERS: [&str; 3] = ["historia/requisito:", "história/requisito:", "feature:"];

/// Loose vocabulary for requirement detection.
const SEPARATOR_VOCABULARY: [&str; 6] = [
    "historia",
    "requisito",
    "user story",
    "cenário",
    "scenario",
    "teste",
];

/// Scenario-level terms. Any of them on a line rules out the loose
/// requirement match and makes the line a scenario separator.
const SCENARIO_TERMS: [&str; 3] = ["cenário", "scenario", "teste"];

/// Category of a single line as seen by the line parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    RequirementSeparator,
    ScenarioSeparator,
    /// Gherkin opener for the given step field.
    Step(CaseField),
    /// Anything else; a continuation when a step field is open.
    Text,
}

/// One entry of the ordered classifier.
pub struct ClassifierRule {
    pub name: &'static str,
    pub kind: LineKind,
    matches: fn(&str) -> bool,
}

impl ClassifierRule {
    pub fn matches(&self, lower: &str) -> bool {
        (self.matches)(lower)
    }
}

/// Classifier rules in priority order.
pub static RULES: [ClassifierRule; 5] = [
    ClassifierRule {
        name: "requirement",
        kind: LineKind::RequirementSeparator,
        matches: is_requirement_separator,
    },
    ClassifierRule {
        name: "scenario",
        kind: LineKind::ScenarioSeparator,
        matches: is_scenario_separator,
    },
    ClassifierRule {
        name: "given",
        kind: LineKind::Step(CaseField::Given),
        matches: opens_given,
    },
    ClassifierRule {
        name: "when",
        kind: LineKind::Step(CaseField::When),
        matches: opens_when,
    },
    ClassifierRule {
        name: "then",
        kind: LineKind::Step(CaseField::Then),
        matches: opens_then,
    },
];

/// Classifies one line. Leading and trailing whitespace is ignored.
///
/// # Examples
///
/// ```
/// use casegen_core::CaseField;
/// use casegen_extract::parser::{LineKind, classify_line};
///
/// assert_eq!(classify_line("Requisito: Login"), LineKind::RequirementSeparator);
/// assert_eq!(classify_line("Cenário: senha inválida"), LineKind::ScenarioSeparator);
/// assert_eq!(classify_line("Quando clica"), LineKind::Step(CaseField::When));
/// assert_eq!(classify_line("   "), LineKind::Blank);
/// ```
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    let lower = trimmed.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lower))
        .map_or(LineKind::Text, |rule| rule.kind)
}

/// Requirement marker, or separator vocabulary with no scenario-level term.
pub fn is_requirement_separator(lower: &str) -> bool {
    contains_any(lower, &REQUIREMENT_MARKERS)
        || (contains_any(lower, &SEPARATOR_VOCABULARY) && !contains_any(lower, &SCENARIO_TERMS))
}

/// Any scenario-level term, with or without a trailing colon.
pub fn is_scenario_separator(lower: &str) -> bool {
    contains_any(lower, &SCENARIO_TERMS)
}

/// Step field opened by a line, if it starts with a Gherkin keyword.
pub fn step_opener(lower: &str) -> Option<CaseField> {
    if opens_given(lower) {
        Some(CaseField::Given)
    } else if opens_when(lower) {
        Some(CaseField::When)
    } else if opens_then(lower) {
        Some(CaseField::Then)
    } else {
        None
    }
}

fn opens_given(lower: &str) -> bool {
    lower.starts_with("dado") || lower.starts_with("given")
}

fn opens_when(lower: &str) -> bool {
    lower.starts_with("quando") || lower.starts_with("when")
}

fn opens_then(lower: &str) -> bool {
    lower.starts_with("então") || lower.starts_with("entao") || lower.starts_with("then")
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_markers() {
        for line in [
            "Historia/Requisito: Login",
            "HISTÓRIA/REQUISITO: Login",
            "Feature: Checkout",
            "User story 12",
            "Requisito 3 - cadastro",
        ] {
            assert_eq!(classify_line(line), LineKind::RequirementSeparator, "{line}");
        }
    }

    #[test]
    fn test_scenario_term_suppresses_loose_requirement() {
        assert_eq!(
            classify_line("Requisito do teste de login"),
            LineKind::ScenarioSeparator
        );
        assert_eq!(classify_line("Scenario: happy path"), LineKind::ScenarioSeparator);
        assert_eq!(classify_line("Cenário 2"), LineKind::ScenarioSeparator);
    }

    #[test]
    fn test_explicit_requirement_marker_beats_scenario_terms() {
        assert_eq!(
            classify_line("Feature: scenario outlines"),
            LineKind::RequirementSeparator
        );
    }

    #[test]
    fn test_separator_beats_step_opener() {
        // A step line mentioning a scenario term is read as a separator.
        assert_eq!(
            classify_line("Dado que o teste começou"),
            LineKind::ScenarioSeparator
        );
    }

    #[test]
    fn test_step_openers_are_case_insensitive() {
        assert_eq!(classify_line("DADO algo"), LineKind::Step(CaseField::Given));
        assert_eq!(classify_line("given x"), LineKind::Step(CaseField::Given));
        assert_eq!(classify_line("When y"), LineKind::Step(CaseField::When));
        assert_eq!(classify_line("ENTÃO z"), LineKind::Step(CaseField::Then));
        assert_eq!(classify_line("entao z"), LineKind::Step(CaseField::Then));
        assert_eq!(classify_line("Then z"), LineKind::Step(CaseField::Then));
    }

    #[test]
    fn test_plain_text_and_blank() {
        assert_eq!(classify_line("o sistema exibe a tela"), LineKind::Text);
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line("\t "), LineKind::Blank);
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names, vec!["requirement", "scenario", "given", "when", "then"]);
    }

    #[test]
    fn test_step_opener_helper() {
        assert_eq!(step_opener("quando envia"), Some(CaseField::When));
        assert_eq!(step_opener("e depois"), None);
    }
}
