//! Line-level diagnostics collected during a parse run.

use serde::{Deserialize, Serialize};

/// Counts of how the line parser treated each physical line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub requirement_lines: usize,
    pub scenario_lines: usize,
    pub step_lines: usize,
    pub continuation_lines: usize,
    /// Non-blank lines discarded because no step field was open.
    pub dropped_lines: usize,
}

impl ParseDiagnostics {
    /// Lines that carried content into a case.
    pub fn recognized_lines(&self) -> usize {
        self.requirement_lines + self.scenario_lines + self.step_lines + self.continuation_lines
    }

    /// Non-blank lines.
    pub fn relevant_lines(&self) -> usize {
        self.total_lines - self.blank_lines
    }

    /// Recognized share of non-blank lines, `0.0` for blank input.
    pub fn coverage(&self) -> f64 {
        let relevant = self.relevant_lines();
        if relevant == 0 {
            return 0.0;
        }
        self.recognized_lines() as f64 / relevant as f64
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.dropped_lines > 0 {
            warnings.push(format!(
                "{} line(s) outside any step were dropped",
                self.dropped_lines
            ));
        }
        if self.relevant_lines() > 0 && self.requirement_lines + self.scenario_lines == 0 {
            warnings.push("No requirement or scenario separators found".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_of_blank_input_is_zero() {
        let diagnostics = ParseDiagnostics {
            total_lines: 3,
            blank_lines: 3,
            ..Default::default()
        };
        assert_eq!(diagnostics.coverage(), 0.0);
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_coverage_and_warnings() {
        let diagnostics = ParseDiagnostics {
            total_lines: 5,
            blank_lines: 1,
            step_lines: 2,
            continuation_lines: 1,
            dropped_lines: 1,
            ..Default::default()
        };
        assert_eq!(diagnostics.coverage(), 0.75);
        assert_eq!(diagnostics.warnings().len(), 2);
    }
}
