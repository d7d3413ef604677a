//! Template validation.
//!
//! Checks the structural invariants of a [`Template`]: a non-empty key and
//! a non-empty column list are required, everything else is reported as a
//! tolerated finding. Rendering never fails on a tolerated finding; a
//! mapping whose target column is absent simply renders nothing.
//!
//! # Examples
//!
//! ```
//! use casegen_core::*;
//!
//! let template = Template::from_columns("ok", ["A", "B", "C", "D", "E"]);
//! assert!(validate_template(&template).is_empty());
//!
//! // Invalid: no columns
//! let bad = Template::new("empty", Vec::<String>::new());
//! assert!(validate_template(&bad).iter().any(TemplateIssue::is_fatal));
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{CaseField, Template};

/// Template validation findings.
///
/// [`is_fatal`](TemplateIssue::is_fatal) separates the findings that make
/// a template unusable from the ones rendering tolerates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateIssue {
    /// Template key is empty or whitespace-only.
    #[error("template name cannot be empty")]
    EmptyName,
    /// Template declares no columns.
    #[error("template must declare at least one column")]
    NoColumns,
    /// A column name is empty or whitespace-only.
    #[error("column {0} has an empty name")]
    BlankColumn(usize),
    /// A field maps to a column the template does not declare.
    #[error("field '{field}' maps to undeclared column '{column}'")]
    MissingTarget { field: CaseField, column: String },
    /// Several fields map to one column; only the last one renders.
    #[error("column '{column}' is targeted by {} fields; '{}' wins", .fields.len(), .winner)]
    AliasedColumn {
        column: String,
        fields: Vec<CaseField>,
        winner: CaseField,
    },
}

impl TemplateIssue {
    /// `true` for findings that make the template unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptyName | Self::NoColumns)
    }
}

/// Validates a template.
///
/// Fatal findings short-circuit; tolerated findings are all collected.
///
/// # Examples
///
/// ```
/// use casegen_core::*;
///
/// let template = Template::from_columns("short", ["A", "B"]);
/// let issues = validate_template(&template);
/// assert!(issues.iter().any(|i| matches!(i, TemplateIssue::AliasedColumn { .. })));
/// assert!(!issues.iter().any(TemplateIssue::is_fatal));
/// ```
pub fn validate_template(template: &Template) -> Vec<TemplateIssue> {
    let mut issues = Vec::new();

    if template.name.trim().is_empty() {
        issues.push(TemplateIssue::EmptyName);
        return issues;
    }
    if template.columns.is_empty() {
        issues.push(TemplateIssue::NoColumns);
        return issues;
    }

    for (idx, column) in template.columns.iter().enumerate() {
        if column.trim().is_empty() {
            issues.push(TemplateIssue::BlankColumn(idx));
        }
    }

    let mut targets: BTreeMap<&str, Vec<CaseField>> = BTreeMap::new();
    for (field, column) in &template.mappings {
        if !template.columns.iter().any(|c| c == column) {
            issues.push(TemplateIssue::MissingTarget {
                field: *field,
                column: column.clone(),
            });
            continue;
        }
        targets.entry(column.as_str()).or_default().push(*field);
    }

    for (column, fields) in targets {
        if fields.len() > 1 {
            let winner = fields[fields.len() - 1];
            issues.push(TemplateIssue::AliasedColumn {
                column: column.to_string(),
                fields,
                winner,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_name() {
        let template = Template::from_columns("  ", ["A"]);
        assert_eq!(validate_template(&template), vec![TemplateIssue::EmptyName]);
    }

    #[test]
    fn test_validate_rejects_no_columns() {
        let template = Template::new("t", Vec::<String>::new());
        assert_eq!(validate_template(&template), vec![TemplateIssue::NoColumns]);
    }

    #[test]
    fn test_validate_reports_missing_target() {
        let template = Template::new("t", ["A"])
            .with_mapping(CaseField::Scenario, "A")
            .with_mapping(CaseField::Then, "Z");

        let issues = validate_template(&template);
        assert_eq!(
            issues,
            vec![TemplateIssue::MissingTarget {
                field: CaseField::Then,
                column: "Z".to_string(),
            }]
        );
        assert!(!issues[0].is_fatal());
    }

    #[test]
    fn test_validate_reports_aliased_column_winner() {
        let template = Template::new("t", ["A", ""])
            .with_mapping(CaseField::Requirement, "A")
            .with_mapping(CaseField::When, "A");

        let issues = validate_template(&template);
        assert!(issues.contains(&TemplateIssue::BlankColumn(1)));
        assert!(issues.contains(&TemplateIssue::AliasedColumn {
            column: "A".to_string(),
            fields: vec![CaseField::Requirement, CaseField::When],
            winner: CaseField::When,
        }));
    }

    #[test]
    fn test_aliased_column_message_names_winner() {
        let issue = TemplateIssue::AliasedColumn {
            column: "A".to_string(),
            fields: vec![CaseField::Given, CaseField::Then],
            winner: CaseField::Then,
        };
        assert_eq!(
            issue.to_string(),
            "column 'A' is targeted by 2 fields; 'then' wins"
        );
    }
}
