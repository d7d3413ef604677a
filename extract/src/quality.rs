//! Quality scoring and rule-based recommendations over a working set.
//!
//! Every aggregate is defined for an empty set: counts and ratios are zero
//! and no threshold rule fires.
//!
//! The score is a fixed weighted sum:
//!
//! ```text
//! 0.4 * completeness_pct
//!   + 30 * min(1, mean over fields of min(avg_len / 50, 1))
//!   + min(30, 100 * gherkin_coverage)
//! ```

use std::collections::BTreeMap;

use casegen_core::{CaseField, TestCase};
use serde::{Deserialize, Serialize};

/// Words that mark a step as Gherkin-phrased.
pub const GHERKIN_TOKENS: [&str; 9] = [
    "dado", "given", "quando", "when", "então", "entao", "then", "and", "e",
];

/// Average length at which a field earns its full content share.
pub const TARGET_FIELD_CHARS: f64 = 50.0;

/// Scenarios shorter than this many characters count as short.
pub const SHORT_SCENARIO_CHARS: usize = 10;

/// Empty-field share above which the high-priority note fires.
pub const EMPTY_FIELD_THRESHOLD: f64 = 0.3;

/// Short-scenario share above which the medium-priority note fires.
pub const SHORT_SCENARIO_THRESHOLD: f64 = 0.2;

/// Gherkin coverage below which the suggestion fires.
pub const GHERKIN_COVERAGE_THRESHOLD: f64 = 0.5;

/// Aggregates over one working set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_cases: usize,
    pub complete_cases: usize,
    pub empty_fields: usize,
    /// Filled share of all fields, as a percentage.
    pub completeness_pct: f64,
    /// Share of cases with all five fields filled.
    pub complete_ratio: f64,
    /// Mean character length per field over cases where it is filled.
    pub average_lengths: BTreeMap<CaseField, f64>,
    pub gherkin_cases: usize,
    pub gherkin_coverage: f64,
    pub short_scenarios: usize,
    /// Weighted score in `0.0..=100.0`.
    pub score: f64,
}

impl QualityMetrics {
    /// Computes every aggregate for `cases`.
    ///
    /// # Examples
    ///
    /// ```
    /// use casegen_core::TestCase;
    /// use casegen_extract::quality::QualityMetrics;
    ///
    /// let metrics = QualityMetrics::compute(&[TestCase::new("R", "S", "", "", "")]);
    /// assert_eq!(metrics.empty_fields, 3);
    /// assert_eq!(metrics.completeness_pct, 40.0);
    ///
    /// let empty = QualityMetrics::compute(&[]);
    /// assert_eq!(empty.score, 0.0);
    /// ```
    pub fn compute(cases: &[TestCase]) -> Self {
        let total = cases.len();
        let mut metrics = Self {
            total_cases: total,
            average_lengths: CaseField::ALL.into_iter().map(|f| (f, 0.0)).collect(),
            ..Self::default()
        };
        if total == 0 {
            return metrics;
        }

        for case in cases {
            let filled = case.filled_fields();
            metrics.empty_fields += CaseField::ALL.len() - filled;
            if filled == CaseField::ALL.len() {
                metrics.complete_cases += 1;
            }
            if has_gherkin_step(case) {
                metrics.gherkin_cases += 1;
            }
            if case.scenario.chars().count() < SHORT_SCENARIO_CHARS {
                metrics.short_scenarios += 1;
            }
        }

        for field in CaseField::ALL {
            let lengths: Vec<usize> = cases
                .iter()
                .map(|case| case.get(field))
                .filter(|value| !value.is_empty())
                .map(|value| value.chars().count())
                .collect();
            if !lengths.is_empty() {
                let average = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
                metrics.average_lengths.insert(field, average);
            }
        }

        let total_fields = (total * CaseField::ALL.len()) as f64;
        metrics.completeness_pct = (total_fields - metrics.empty_fields as f64) / total_fields * 100.0;
        metrics.complete_ratio = metrics.complete_cases as f64 / total as f64;
        metrics.gherkin_coverage = metrics.gherkin_cases as f64 / total as f64;
        metrics.score = metrics.weighted_score();
        metrics
    }

    /// Share of empty fields among all `5 * total_cases` fields.
    pub fn empty_ratio(&self) -> f64 {
        if self.total_cases == 0 {
            return 0.0;
        }
        self.empty_fields as f64 / (self.total_cases * CaseField::ALL.len()) as f64
    }

    /// Share of cases whose scenario is shorter than [`SHORT_SCENARIO_CHARS`].
    pub fn short_scenario_ratio(&self) -> f64 {
        if self.total_cases == 0 {
            return 0.0;
        }
        self.short_scenarios as f64 / self.total_cases as f64
    }

    fn weighted_score(&self) -> f64 {
        let completeness = 0.4 * self.completeness_pct;

        let content_mean = self
            .average_lengths
            .values()
            .map(|avg| (avg / TARGET_FIELD_CHARS).min(1.0))
            .sum::<f64>()
            / CaseField::ALL.len() as f64;
        let content = 30.0 * content_mean.min(1.0);

        let gherkin = (100.0 * self.gherkin_coverage).min(30.0);

        (completeness + content + gherkin).clamp(0.0, 100.0)
    }
}

/// `true` when any step field contains a Gherkin token.
pub fn has_gherkin_step(case: &TestCase) -> bool {
    [&case.given, &case.when, &case.then]
        .into_iter()
        .any(|text| contains_gherkin_token(text))
}

/// Case-insensitive substring match against [`GHERKIN_TOKENS`].
///
/// Step fields arrive with their keyword already stripped, so any
/// occurrence counts, including inside a longer word.
pub fn contains_gherkin_token(text: &str) -> bool {
    let lower = text.to_lowercase();
    GHERKIN_TOKENS.iter().any(|token| lower.contains(token))
}

/// Urgency of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Suggestion,
}

impl Priority {
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::High => "HIGH PRIORITY",
            Self::Medium => "MEDIUM PRIORITY",
            Self::Suggestion => "SUGGESTIONS",
        }
    }
}

/// One fired threshold rule and its notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub notes: Vec<String>,
}

impl Recommendation {
    fn new(priority: Priority, notes: [&str; 2]) -> Self {
        Self {
            priority,
            notes: notes.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Closing block appended to every recommendation text.
pub const RECOMMENDED_ACTIONS: [&str; 3] = [
    "Review and edit the cases in the preview",
    "Use different templates for different needs",
    "Export the table for further analysis",
];

/// Metrics plus the recommendations derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub metrics: QualityMetrics,
    pub recommendations: Vec<Recommendation>,
}

/// Scores a working set and derives recommendations.
///
/// # Examples
///
/// ```
/// use casegen_core::TestCase;
/// use casegen_extract::quality::{Priority, analyze};
///
/// let report = analyze(&[TestCase::new("", "short", "", "", "")]);
/// let priorities: Vec<_> = report.recommendations.iter().map(|r| r.priority).collect();
/// assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Suggestion]);
/// ```
pub fn analyze(cases: &[TestCase]) -> QualityReport {
    let metrics = QualityMetrics::compute(cases);
    let recommendations = recommend(&metrics);
    QualityReport {
        metrics,
        recommendations,
    }
}

/// Applies the threshold rules to `metrics`.
pub fn recommend(metrics: &QualityMetrics) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if metrics.total_cases == 0 {
        return recommendations;
    }

    if metrics.empty_ratio() > EMPTY_FIELD_THRESHOLD {
        recommendations.push(Recommendation::new(
            Priority::High,
            [
                "Fill in the empty fields of the test cases",
                "Review the automatic extraction of the source document",
            ],
        ));
    }
    if metrics.short_scenario_ratio() > SHORT_SCENARIO_THRESHOLD {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            [
                "Describe the test scenarios in more detail",
                "Add more context to the short cases",
            ],
        ));
    }
    if metrics.gherkin_coverage < GHERKIN_COVERAGE_THRESHOLD {
        recommendations.push(Recommendation::new(
            Priority::Suggestion,
            [
                "Use Gherkin patterns (Given/When/Then)",
                "Standardize the language of the test cases",
            ],
        ));
    }
    recommendations
}

impl QualityReport {
    /// Metrics block: general statistics, content analysis and the score.
    pub fn metrics_text(&self, generated_at: &str) -> String {
        let m = &self.metrics;
        let mut out = format!("QUALITY REPORT - {generated_at}\n\n");

        out.push_str("GENERAL STATISTICS:\n");
        out.push_str(&format!("   • Total test cases: {}\n", m.total_cases));
        out.push_str(&format!(
            "   • Complete cases: {} ({:.1}%)\n",
            m.complete_cases,
            m.complete_ratio * 100.0
        ));
        out.push_str(&format!("   • Overall completeness: {:.1}%\n", m.completeness_pct));
        out.push_str(&format!("   • Empty fields: {}\n\n", m.empty_fields));

        out.push_str("CONTENT ANALYSIS:\n");
        for (field, average) in &m.average_lengths {
            out.push_str(&format!("   • {field}: {average:.1} chars/case\n"));
        }
        out.push_str(&format!(
            "   • Gherkin patterns identified: {} cases\n\n",
            m.gherkin_cases
        ));

        out.push_str(&format!("QUALITY SCORE: {:.1}/100\n", m.score));
        out
    }

    /// Recommendation block grouped by priority, ending with the fixed
    /// recommended actions.
    pub fn recommendations_text(&self) -> String {
        let mut out = String::from("RECOMMENDATIONS FOR IMPROVEMENT:\n\n");
        for recommendation in &self.recommendations {
            out.push_str(&format!("{}:\n", recommendation.priority.heading()));
            for note in &recommendation.notes {
                out.push_str(&format!("   • {note}\n"));
            }
            out.push('\n');
        }

        out.push_str("RECOMMENDED ACTIONS:\n");
        for action in RECOMMENDED_ACTIONS {
            out.push_str(&format!("   • {action}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(prefix: &str) -> String {
        format!("{prefix} {}", "x".repeat(60))
    }

    #[test]
    fn test_full_quality_set_scores_maximum() {
        let case = TestCase::new(
            long("requirement"),
            long("scenario"),
            long("given the user"),
            long("when they submit"),
            long("then it works"),
        );
        let metrics = QualityMetrics::compute(&[case.clone(), case]);
        assert_eq!(metrics.completeness_pct, 100.0);
        assert_eq!(metrics.gherkin_coverage, 1.0);
        assert!((metrics.score - 100.0).abs() < 1e-9, "score {}", metrics.score);
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let report = analyze(&[]);
        assert_eq!(report.metrics.total_cases, 0);
        assert_eq!(report.metrics.completeness_pct, 0.0);
        assert_eq!(report.metrics.score, 0.0);
        assert!(report.recommendations.is_empty());
        assert!(report.metrics_text("now").contains("Total test cases: 0"));
    }

    #[test]
    fn test_average_length_ignores_empty_values() {
        let metrics = QualityMetrics::compute(&[
            TestCase::new("abcd", "", "", "", ""),
            TestCase::new("ab", "", "", "", ""),
            TestCase::new("", "", "", "", ""),
        ]);
        assert_eq!(metrics.average_lengths[&CaseField::Requirement], 3.0);
        assert_eq!(metrics.average_lengths[&CaseField::Then], 0.0);
    }

    #[test]
    fn test_lengths_count_characters() {
        let metrics = QualityMetrics::compute(&[TestCase::new("ação", "", "", "", "")]);
        assert_eq!(metrics.average_lengths[&CaseField::Requirement], 4.0);
    }

    #[test]
    fn test_gherkin_tokens_match_as_substrings() {
        assert!(contains_gherkin_token("o usuário clica e confirma"));
        assert!(contains_gherkin_token("Given: a user"));
        assert!(contains_gherkin_token("the tender offer"));
        assert!(!contains_gherkin_token("xyz 123"));
        assert!(!contains_gherkin_token(""));
    }

    #[test]
    fn test_parsed_gherkin_document_is_fully_covered() {
        let text = "Requisito: Login\n\
                    Cenário: credenciais válidas\n\
                    Dado que o usuário está cadastrado\n\
                    Quando informa e-mail e senha\n\
                    Então acessa o painel\n\
                    \n\
                    Cenário: senha incorreta\n\
                    Dado que o usuário está cadastrado\n\
                    Quando informa uma senha errada\n\
                    Então vê a mensagem de erro\n";
        let run = crate::extract_text(text);
        assert_eq!(run.cases.len(), 2);
        assert_eq!(run.cases[0].given, "o usuário está cadastrado");

        let report = analyze(&run.cases);
        assert_eq!(report.metrics.gherkin_cases, 2);
        assert_eq!(report.metrics.gherkin_coverage, 1.0);
        assert!(
            report
                .recommendations
                .iter()
                .all(|r| r.priority != Priority::Suggestion)
        );
    }

    #[test]
    fn test_score_components() {
        // One case, two of five fields filled with short text, no Gherkin.
        let metrics = QualityMetrics::compute(&[TestCase::new("x".repeat(25), "y".repeat(50), "", "", "")]);
        // 0.4 * 40 + 30 * ((0.5 + 1.0) / 5) + 0
        assert!((metrics.score - 25.0).abs() < 1e-9, "score {}", metrics.score);
    }

    #[test]
    fn test_thresholds() {
        let good = TestCase::new("R", "A long enough scenario", "given x", "when y", "then z");
        let report = analyze(&[good.clone(), good.clone(), good.clone(), good]);
        assert!(report.recommendations.is_empty());

        let mut cases = vec![TestCase::new("R", "A long enough scenario", "given x", "when y", "then z"); 4];
        cases.push(TestCase::new("R", "tiny", "", "", ""));
        // 3 empty of 25 fields, 1 short of 5 cases, 4 of 5 with Gherkin.
        assert!(analyze(&cases).recommendations.is_empty());
    }

    #[test]
    fn test_recommendation_text_has_sections_and_actions() {
        let report = analyze(&[TestCase::new("", "", "", "", "")]);
        let text = report.recommendations_text();
        assert!(text.starts_with("RECOMMENDATIONS FOR IMPROVEMENT:"));
        assert!(text.contains("HIGH PRIORITY:\n   • Fill in the empty fields"));
        assert!(text.contains("MEDIUM PRIORITY:"));
        assert!(text.contains("SUGGESTIONS:"));
        assert!(text.trim_end().ends_with("Export the table for further analysis"));
    }

    #[test]
    fn test_metrics_text_lists_every_field() {
        let report = analyze(&[TestCase::new("R", "S", "G", "W", "T")]);
        let text = report.metrics_text("2026-01-01 10:00");
        assert!(text.starts_with("QUALITY REPORT - 2026-01-01 10:00"));
        for field in CaseField::ALL {
            assert!(text.contains(&format!("• {field}: 1.0 chars/case")));
        }
        assert!(text.contains("Complete cases: 1 (100.0%)"));
    }
}
