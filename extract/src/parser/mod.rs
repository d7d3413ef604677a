//! Keyword-driven line parser for Gherkin-style prose.
//!
//! Case boundaries come from separator keywords, not from blank lines:
//! source documents have inconsistent spacing, and a single step is often
//! wrapped across many physical lines.
//!
//! # Architecture
//!
//! Every line is first classified by an ordered rule list
//! ([`classify_line`]): requirement separator, scenario separator, then the
//! given/when/then openers. [`LineParser`] then applies one state
//! transition per line:
//!
//! 1. **Requirement separator** flushes the current case and starts a new
//!    one holding the payload after the colon.
//! 2. **Scenario separator** flushes only when the current case already
//!    has a scenario, carrying the requirement into the next case.
//! 3. **Step opener** opens that field and appends the line without its
//!    keyword.
//! 4. **Text** is appended to the open field, or dropped when none is open.
//! 5. **Blank** closes the open field without ending the case.
//!
//! Most consumers should call [`crate::extract_text`], which adds
//! normalization, fallback synthesis and a report on top of this module.

mod classify;
mod diagnostics;
mod keywords;
mod normalize;

use casegen_core::{CaseField, TestCase};
use tracing::debug;

pub use classify::{
    ClassifierRule, LineKind, RULES, classify_line, is_requirement_separator,
    is_scenario_separator, step_opener,
};
pub use diagnostics::ParseDiagnostics;
pub use keywords::{clean_gherkin_keyword, extract_after_colon};
pub use normalize::normalize_text;

/// Output of one line-parser run.
#[derive(Debug, Clone, Default)]
pub struct LineParse {
    pub cases: Vec<TestCase>,
    pub diagnostics: ParseDiagnostics,
}

/// Stateful scanner turning lines into test cases.
///
/// # Examples
///
/// ```
/// use casegen_extract::parser::LineParser;
///
/// let text = "\
/// Requisito: Login
/// Cenário: credenciais válidas
/// Dado que o usuário existe
/// Quando informa a senha
/// Então acessa o painel
/// Cenário: senha errada
/// Quando informa outra senha
/// Então vê um erro
/// ";
///
/// let parse = LineParser::parse(text);
/// assert_eq!(parse.cases.len(), 2);
/// assert_eq!(parse.cases[1].requirement, "Login");
/// assert_eq!(parse.cases[1].then, "vê um erro");
/// ```
#[derive(Debug, Default)]
pub struct LineParser {
    cases: Vec<TestCase>,
    current: TestCase,
    open_field: Option<CaseField>,
    diagnostics: ParseDiagnostics,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a whole text. No fallback is applied: unrecognized input
    /// yields an empty case list.
    pub fn parse(text: &str) -> LineParse {
        let mut parser = Self::new();
        for line in text.split('\n') {
            parser.feed_line(line);
        }
        parser.finish()
    }

    /// Field currently receiving continuation lines.
    pub fn open_field(&self) -> Option<CaseField> {
        self.open_field
    }

    /// Applies one line to the state machine.
    pub fn feed_line(&mut self, line: &str) {
        self.diagnostics.total_lines += 1;
        let trimmed = line.trim();

        match classify_line(trimmed) {
            LineKind::Blank => {
                self.diagnostics.blank_lines += 1;
                self.open_field = None;
            }
            LineKind::RequirementSeparator => {
                self.diagnostics.requirement_lines += 1;
                if !self.current.is_empty() {
                    self.flush();
                }
                self.current = TestCase::default();
                self.current.requirement = extract_after_colon(trimmed);
                self.open_field = None;
            }
            LineKind::ScenarioSeparator => {
                self.diagnostics.scenario_lines += 1;
                if !self.current.scenario.is_empty() {
                    let requirement = self.flush();
                    self.current = TestCase::default();
                    self.current.requirement = requirement;
                }
                self.current.scenario = extract_after_colon(trimmed);
                self.open_field = None;
            }
            LineKind::Step(field) => {
                self.diagnostics.step_lines += 1;
                self.open_field = Some(field);
                let value = self.current.get_mut(field);
                value.push_str(&clean_gherkin_keyword(trimmed));
                value.push(' ');
            }
            LineKind::Text => match self.open_field {
                Some(field) => {
                    self.diagnostics.continuation_lines += 1;
                    let value = self.current.get_mut(field);
                    value.push_str(trimmed);
                    value.push(' ');
                }
                None => self.diagnostics.dropped_lines += 1,
            },
        }
    }

    /// Flushes the last case and returns everything collected.
    pub fn finish(mut self) -> LineParse {
        if !self.current.is_empty() {
            self.flush();
        }
        debug!(
            cases = self.cases.len(),
            lines = self.diagnostics.total_lines,
            dropped = self.diagnostics.dropped_lines,
            "Line parse finished"
        );
        LineParse {
            cases: self.cases,
            diagnostics: self.diagnostics,
        }
    }

    /// Trims and stores the current case, returning its requirement.
    fn flush(&mut self) -> String {
        let mut case = std::mem::take(&mut self.current);
        case.trim_fields();
        let requirement = case.requirement.clone();
        self.cases.push(case);
        requirement
    }
}

/// Parses text into cases, synthesizing fallback cases when the scan
/// recovers nothing.
///
/// Returns an empty list only when every paragraph is too short for the
/// fallback to use.
pub fn parse_test_cases(text: &str) -> Vec<TestCase> {
    let parse = LineParser::parse(text);
    if parse.cases.is_empty() {
        return crate::fallback::synthesize(text);
    }
    parse.cases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_carries_over_two_scenarios() {
        let text = "\
Requisito: Carrinho
Cenário: adicionar item
Dado um carrinho vazio
Quando adiciona um item
Então o total é atualizado
Cenário: remover item
Dado um carrinho com um item
Quando remove o item
Então o carrinho fica vazio";

        let parse = LineParser::parse(text);
        assert_eq!(parse.cases.len(), 2);
        let [first, second] = &parse.cases[..] else {
            panic!("expected two cases");
        };
        assert_eq!(first.requirement, "Carrinho");
        assert_eq!(second.requirement, "Carrinho");
        assert_eq!(first.scenario, "adicionar item");
        assert_eq!(second.scenario, "remover item");
        assert_eq!(first.given, "um carrinho vazio");
        assert_eq!(second.when, "remove o item");
    }

    #[test]
    fn test_wrapped_step_lines_are_joined() {
        let text = "\
Cenário: relatório
Quando o usuário gera
o relatório mensal
com filtros
Então vê o PDF";

        let parse = LineParser::parse(text);
        assert_eq!(parse.cases[0].when, "o usuário gera o relatório mensal com filtros");
        assert_eq!(parse.diagnostics.continuation_lines, 2);
    }

    #[test]
    fn test_blank_line_closes_field_without_ending_case() {
        let text = "\
Cenário: login
Dado um usuário

texto solto
Então entra";

        let parse = LineParser::parse(text);
        assert_eq!(parse.cases.len(), 1);
        assert_eq!(parse.cases[0].given, "um usuário");
        assert_eq!(parse.cases[0].then, "entra");
        assert_eq!(parse.diagnostics.dropped_lines, 1);
    }

    #[test]
    fn test_repeated_step_keyword_appends() {
        let parse = LineParser::parse("Scenario: x\nGiven a\nGiven b");
        assert_eq!(parse.cases[0].given, "a b");
    }

    #[test]
    fn test_new_requirement_flushes_previous_case() {
        let text = "\
Feature: A
Scenario: a1
Then ok
Feature: B
Scenario: b1";

        let parse = LineParser::parse(text);
        let requirements: Vec<_> = parse.cases.iter().map(|c| c.requirement.as_str()).collect();
        assert_eq!(requirements, vec!["A", "B"]);
        assert_eq!(parse.cases[1].scenario, "b1");
    }

    #[test]
    fn test_scenario_without_colon_keeps_whole_line() {
        let parse = LineParser::parse("Teste de cadastro\nDado algo");
        assert_eq!(parse.cases[0].scenario, "Teste de cadastro");
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let parse = LineParser::parse("Cenário: a\r\nDado b\r\n");
        assert_eq!(parse.cases[0].given, "b");
    }

    #[test]
    fn test_unrecognized_text_yields_no_cases() {
        let parse = LineParser::parse("apenas texto\nsem estrutura");
        assert!(parse.cases.is_empty());
        assert_eq!(parse.diagnostics.dropped_lines, 2);
    }

    #[test]
    fn test_parse_test_cases_falls_back() {
        let cases = parse_test_cases("Um parágrafo longo sem nenhuma palavra-chave reconhecida.");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].requirement, "Requirement 1");
    }

    #[test]
    fn test_parse_test_cases_short_input_is_empty() {
        assert!(parse_test_cases("curto").is_empty());
    }
}
