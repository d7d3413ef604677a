//! Column templates and the projection between cases and table rows.
//!
//! A [`Template`] declares an ordered list of display columns and a
//! field-to-column mapping. Rendering walks the columns and, for each one,
//! looks up the field that targets it. Several fields may target the same
//! column; the field declared last in the fixed field order
//! (`requirement, scenario, given, when, then`) wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CaseField, TestCase};

/// Named column schema plus field-to-column aliasing.
///
/// # Examples
///
/// ```
/// use casegen_core::{CaseField, Template, TestCase};
///
/// let template = Template::new("minimal", ["Story", "Steps"])
///     .with_mapping(CaseField::Requirement, "Story")
///     .with_mapping(CaseField::When, "Steps");
///
/// let case = TestCase::new("Login", "Valid user", "", "submits form", "");
/// let table = template.render(&[case]);
/// assert_eq!(table.header, vec!["Story", "Steps"]);
/// assert_eq!(table.rows[0], vec!["Login", "submits form"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique registry key (e.g. `padrao_gherkin`).
    pub name: String,
    /// Human-readable title; falls back to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ordered display columns.
    pub columns: Vec<String>,
    /// Field → column aliases. Unmapped fields are not rendered.
    #[serde(default)]
    pub mappings: BTreeMap<CaseField, String>,
}

impl Template {
    /// Creates a template with the given columns and no mappings.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            title: None,
            columns: columns.into_iter().map(Into::into).collect(),
            mappings: BTreeMap::new(),
        }
    }

    /// Creates a template whose fields map positionally onto `columns`.
    ///
    /// The i-th field of the fixed order maps to the i-th column. Fields past
    /// the last column map to the first column, so with fewer than five
    /// columns the first column shows the last such field.
    ///
    /// # Examples
    ///
    /// ```
    /// use casegen_core::{CaseField, Template};
    ///
    /// let template = Template::from_columns("short", ["A", "B"]);
    /// assert_eq!(template.mappings[&CaseField::Scenario], "B");
    /// assert_eq!(template.column_field("A"), Some(CaseField::Then));
    /// ```
    pub fn from_columns<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut template = Self::new(name, columns);
        if let Some(first) = template.columns.first().cloned() {
            for (idx, field) in CaseField::ALL.into_iter().enumerate() {
                let column = template
                    .columns
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| first.clone());
                template.mappings.insert(field, column);
            }
        }
        template
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Maps `field` onto `column`, replacing any previous mapping for it.
    pub fn with_mapping(mut self, field: CaseField, column: impl Into<String>) -> Self {
        self.mappings.insert(field, column.into());
        self
    }

    /// Display title, or the key when no title was set.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Resolves the field rendered in `column`.
    ///
    /// Returns the last field in the fixed order whose mapping targets
    /// `column`, or `None` when nothing maps there.
    pub fn column_field(&self, column: &str) -> Option<CaseField> {
        CaseField::ALL
            .into_iter()
            .rev()
            .find(|field| self.mappings.get(field).is_some_and(|c| c == column))
    }

    /// Resolved field for every column, aligned with [`columns`](Self::columns).
    pub fn column_fields(&self) -> Vec<Option<CaseField>> {
        self.columns
            .iter()
            .map(|column| self.column_field(column))
            .collect()
    }

    /// Fields that have no mapping and therefore never render.
    pub fn unmapped_fields(&self) -> Vec<CaseField> {
        CaseField::ALL
            .into_iter()
            .filter(|field| !self.mappings.contains_key(field))
            .collect()
    }

    /// Projects one case onto the template columns.
    pub fn render_row(&self, case: &TestCase) -> Vec<String> {
        self.column_fields()
            .into_iter()
            .map(|field| field.map(|f| case.get(f).to_string()).unwrap_or_default())
            .collect()
    }

    /// Projects a working set onto the template. One row per case.
    pub fn render(&self, cases: &[TestCase]) -> RenderedTable {
        let fields = self.column_fields();
        let rows = cases
            .iter()
            .map(|case| {
                fields
                    .iter()
                    .map(|field| field.map(|f| case.get(f).to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        RenderedTable {
            header: self.columns.clone(),
            rows,
        }
    }

    /// Writes `value` into the field behind `column_index` of the case at
    /// `case_index`.
    ///
    /// Returns `false` without touching anything when either index is out of
    /// bounds or no field maps to the column.
    ///
    /// # Examples
    ///
    /// ```
    /// use casegen_core::{Template, TestCase};
    ///
    /// let template = Template::from_columns("t", ["R", "S", "G", "W", "T"]);
    /// let mut cases = vec![TestCase::default()];
    /// assert!(template.apply_edit(&mut cases, 0, 2, "logged in"));
    /// assert_eq!(cases[0].given, "logged in");
    /// assert!(!template.apply_edit(&mut cases, 3, 0, "ignored"));
    /// ```
    pub fn apply_edit(
        &self,
        cases: &mut [TestCase],
        case_index: usize,
        column_index: usize,
        value: impl Into<String>,
    ) -> bool {
        let Some(column) = self.columns.get(column_index) else {
            return false;
        };
        let Some(field) = self.column_field(column) else {
            return false;
        };
        let Some(case) = cases.get_mut(case_index) else {
            return false;
        };
        case.set(field, value);
        true
    }

    /// Multi-line description: title, columns and mapping lines.
    pub fn describe(&self) -> String {
        let mut out = format!("Template: {}\n\n", self.display_name());
        out.push_str(&format!("Columns: {}\n\n", self.columns.join(", ")));
        out.push_str("Mappings:\n");
        for (field, column) in &self.mappings {
            out.push_str(&format!("  {field} → {column}\n"));
        }
        for field in self.unmapped_fields() {
            out.push_str(&format!("  {field} → (not exported)\n"));
        }
        out
    }
}

/// Rows produced by [`Template::render`]; the header is the column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
