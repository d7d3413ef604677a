//! Output formatting for rendered tables, case sets and reports.

use casegen_core::{CaseField, CaseSet, RenderedTable, TestCase};

use crate::quality::QualityReport;
use crate::report::ExtractionReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
    Csv,
}

/// Formats a rendered table. CSV output is the tabular export: header row
/// first, one record per case.
///
/// # Examples
///
/// ```
/// use casegen_core::RenderedTable;
/// use casegen_extract::output::{OutputFormat, format_table};
///
/// let table = RenderedTable {
///     header: vec!["Cenário".into(), "Então".into()],
///     rows: vec![vec!["login".into(), "vê, o painel".into()]],
/// };
/// let csv = format_table(&table, OutputFormat::Csv).unwrap();
/// assert_eq!(csv, "Cenário,Então\nlogin,\"vê, o painel\"\n");
/// ```
pub fn format_table(table: &RenderedTable, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(table)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(table).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(table_to_markdown(table)),
        OutputFormat::Table => Ok(table_to_text(table)),
        OutputFormat::Csv => table_to_csv(table),
    }
}

/// Formats a case set. Tabular formats lay the cases out one column per
/// field, named by the field key.
pub fn format_case_set(set: &CaseSet, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(set)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(set).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown | OutputFormat::Table | OutputFormat::Csv => {
            format_table(&field_table(&set.cases), format)
        }
    }
}

/// Formats an extraction report in the requested output format.
pub fn format_report(report: &ExtractionReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
        OutputFormat::Csv => table_to_csv(&report_to_record(report)),
    }
}

/// Formats a quality report. `Table` yields the plain-text metrics and
/// recommendation blocks.
pub fn format_quality(
    report: &QualityReport,
    format: OutputFormat,
    generated_at: &str,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(format!(
            "{}\n{}",
            report.metrics_text(generated_at),
            report.recommendations_text()
        )),
        OutputFormat::Markdown => Ok(quality_to_markdown(report, generated_at)),
        OutputFormat::Csv => table_to_csv(&quality_to_record(report)),
    }
}

/// One column per field in the fixed field order.
pub fn field_table(cases: &[TestCase]) -> RenderedTable {
    RenderedTable {
        header: CaseField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        rows: cases
            .iter()
            .map(|case| case.fields().map(|(_, value)| value.to_string()).collect())
            .collect(),
    }
}

fn table_to_csv(table: &RenderedTable) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.header)
        .map_err(|e| format!("CSV serialization failed: {e}"))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| format!("CSV serialization failed: {e}"))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| format!("CSV serialization failed: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV output is not UTF-8: {e}"))
}

fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', "<br>")
}

fn table_to_markdown(table: &RenderedTable) -> String {
    let mut out = String::new();
    let header: Vec<String> = table.header.iter().map(|h| markdown_cell(h)).collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        vec!["---"; table.header.len()].join("|")
    ));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| markdown_cell(c)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn table_to_text(table: &RenderedTable) -> String {
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&table.header);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&rule));
    for row in &table.rows {
        out.push_str(&line(row));
    }
    out
}

fn report_to_markdown(report: &ExtractionReport) -> String {
    let mut out = String::new();

    let source = report.source.as_deref().unwrap_or("(inline)");
    out.push_str(&format!("# Extraction Report: {source}\n\n"));
    out.push_str(&format!("- **Format:** {}\n", report.format));
    out.push_str(&format!("- **Producer:** {}\n", report.producer));
    out.push_str(&format!("- **Cases:** {}\n", report.case_count));
    out.push_str(&format!(
        "- **Fallback:** {}\n",
        if report.fallback_used { "yes" } else { "no" }
    ));
    if let Some(ref lines) = report.lines {
        out.push_str(&format!(
            "- **Lines:** {} total, {} recognized, {} dropped\n",
            lines.total_lines,
            lines.recognized_lines(),
            lines.dropped_lines
        ));
        out.push_str(&format!("- **Coverage:** {:.2}\n", report.coverage));
    }
    if report.nodes_visited > 0 {
        out.push_str(&format!("- **Nodes visited:** {}\n", report.nodes_visited));
    }
    if report.depth_hits > 0 {
        out.push_str(&format!("- **Depth guard hits:** {}\n", report.depth_hits));
    }

    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn report_to_table(report: &ExtractionReport) -> String {
    let source = report.source.as_deref().unwrap_or("-");
    let mut out = format!(
        "{:<30} {:<5} {:<12} cases={} cov={:.2}",
        source,
        report.format.label(),
        report.producer.label(),
        report.case_count,
        report.coverage,
    );
    if report.fallback_used {
        out.push_str("  [fallback]");
    }
    out.push('\n');
    out
}

fn report_to_record(report: &ExtractionReport) -> RenderedTable {
    let header = [
        "source",
        "format",
        "producer",
        "case_count",
        "fallback_used",
        "coverage",
        "warnings",
    ];
    RenderedTable {
        header: header.iter().map(|h| h.to_string()).collect(),
        rows: vec![vec![
            report.source.clone().unwrap_or_default(),
            report.format.to_string(),
            report.producer.to_string(),
            report.case_count.to_string(),
            report.fallback_used.to_string(),
            format!("{:.2}", report.coverage),
            report.warnings.join("; "),
        ]],
    }
}

fn quality_to_markdown(report: &QualityReport, generated_at: &str) -> String {
    let m = &report.metrics;
    let mut out = format!("# Quality Report\n\n_{generated_at}_\n\n");
    out.push_str(&format!("**Score:** {:.1}/100\n\n", m.score));
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Total cases | {} |\n", m.total_cases));
    out.push_str(&format!(
        "| Complete cases | {} ({:.1}%) |\n",
        m.complete_cases,
        m.complete_ratio * 100.0
    ));
    out.push_str(&format!("| Completeness | {:.1}% |\n", m.completeness_pct));
    out.push_str(&format!("| Empty fields | {} |\n", m.empty_fields));
    out.push_str(&format!("| Gherkin cases | {} |\n", m.gherkin_cases));

    for recommendation in &report.recommendations {
        out.push_str(&format!("\n## {}\n\n", recommendation.priority.heading()));
        for note in &recommendation.notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    out
}

fn quality_to_record(report: &QualityReport) -> RenderedTable {
    let m = &report.metrics;
    let rows = [
        ("total_cases", m.total_cases.to_string()),
        ("complete_cases", m.complete_cases.to_string()),
        ("empty_fields", m.empty_fields.to_string()),
        ("completeness_pct", format!("{:.1}", m.completeness_pct)),
        ("gherkin_cases", m.gherkin_cases.to_string()),
        ("short_scenarios", m.short_scenarios.to_string()),
        ("score", format!("{:.1}", m.score)),
    ];
    RenderedTable {
        header: vec!["metric".to_string(), "value".to_string()],
        rows: rows
            .into_iter()
            .map(|(name, value)| vec![name.to_string(), value])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegen_core::{Producer, SourceFormat};

    fn sample_table() -> RenderedTable {
        RenderedTable {
            header: vec!["Cenário".to_string(), "Então".to_string()],
            rows: vec![
                vec!["login".to_string(), "vê o painel".to_string()],
                vec!["a|b".to_string(), "linha 1\nlinha 2".to_string()],
            ],
        }
    }

    fn sample_report() -> ExtractionReport {
        let mut report = ExtractionReport::new(SourceFormat::Text, Producer::Fallback);
        report.source = Some("notes.txt".to_string());
        report.case_count = 2;
        report.fallback_used = true;
        report.warnings = vec!["needs manual completion".to_string()];
        report
    }

    #[test]
    fn test_format_table_json() {
        let json = format_table(&sample_table(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["header"][0], "Cenário");
        assert_eq!(value["rows"][0][1], "vê o painel");
    }

    #[test]
    fn test_format_table_csv_quotes_special_cells() {
        let csv = format_table(&sample_table(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Cenário,Então"));
        assert_eq!(lines.next(), Some("login,vê o painel"));
        assert!(csv.contains("\"linha 1\nlinha 2\""));
    }

    #[test]
    fn test_format_table_csv_header_only() {
        let table = RenderedTable {
            header: vec!["A".to_string(), "B".to_string()],
            rows: Vec::new(),
        };
        assert_eq!(format_table(&table, OutputFormat::Csv).unwrap(), "A,B\n");
    }

    #[test]
    fn test_format_table_markdown_escapes_pipes() {
        let md = format_table(&sample_table(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("| Cenário | Então |\n|---|---|\n"));
        assert!(md.contains("a\\|b"));
        assert!(md.contains("linha 1<br>linha 2"));
    }

    #[test]
    fn test_format_table_text_aligns_columns() {
        let table = RenderedTable {
            header: vec!["ID".to_string(), "Name".to_string()],
            rows: vec![vec!["1".to_string(), "checkout".to_string()]],
        };
        let text = format_table(&table, OutputFormat::Table).unwrap();
        assert_eq!(text, "ID  Name\n--  --------\n1   checkout\n");
    }

    #[test]
    fn test_format_case_set_csv_uses_field_keys() {
        let mut set = CaseSet::new("2026-01-01T00:00:00Z");
        set.cases.push(TestCase::new("R", "S", "G", "W", "T"));
        let csv = format_case_set(&set, OutputFormat::Csv).unwrap();
        assert_eq!(csv, "requirement,scenario,given,when,then\nR,S,G,W,T\n");
    }

    #[test]
    fn test_format_case_set_yaml() {
        let mut set = CaseSet::new("2026-01-01T00:00:00Z");
        set.cases.push(TestCase::default().with(CaseField::Then, "ok"));
        let yaml = format_case_set(&set, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("generated_at"));
        assert!(yaml.contains("then: ok"));
    }

    #[test]
    fn test_format_report_markdown() {
        let md = format_report(&sample_report(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# Extraction Report: notes.txt"));
        assert!(md.contains("**Producer:** fallback"));
        assert!(md.contains("**Fallback:** yes"));
        assert!(md.contains("needs manual completion"));
    }

    #[test]
    fn test_format_report_table_marks_fallback() {
        let table = format_report(&sample_report(), OutputFormat::Table).unwrap();
        assert!(table.contains("notes.txt"));
        assert!(table.contains("cases=2"));
        assert!(table.contains("[fallback]"));
    }

    #[test]
    fn test_format_report_csv() {
        let csv = format_report(&sample_report(), OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("source,format,producer,case_count"));
        assert!(csv.contains("notes.txt,text,fallback,2,true"));
    }

    #[test]
    fn test_format_quality_text_blocks() {
        let report = crate::quality::analyze(&[TestCase::new("R", "S", "", "", "")]);
        let text = format_quality(&report, OutputFormat::Table, "2026-01-01 10:00").unwrap();
        assert!(text.starts_with("QUALITY REPORT - 2026-01-01 10:00"));
        assert!(text.contains("RECOMMENDATIONS FOR IMPROVEMENT:"));

        let csv = format_quality(&report, OutputFormat::Csv, "").unwrap();
        assert!(csv.contains("empty_fields,3"));
    }
}
