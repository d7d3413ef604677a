use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use casegen_core::{CaseSet, RenderedTable};
use casegen_extract::output::{
    OutputFormat, format_case_set, format_quality, format_report, format_table,
};
use casegen_extract::{Document, ExtractError, ExtractionReport, Session};
use casegen_templates::{EngineConfig, TemplateRegistry, save_template};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "casegen.yml";

/// Output format of the `analyze` command.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum AnalyzeFormat {
    Text,
    Json,
    Yaml,
}

impl From<AnalyzeFormat> for OutputFormat {
    fn from(fmt: AnalyzeFormat) -> Self {
        match fmt {
            AnalyzeFormat::Text => Self::Table,
            AnalyzeFormat::Json => Self::Json,
            AnalyzeFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "casegen")]
#[command(about = "Turn requirement documents into Gherkin-style test-case tables")]
struct Cli {
    /// Engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Extra directory of template files, loaded after the configured ones.
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,
    /// Log decisions at debug level on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract test cases from documents and render them through a template.
    Convert(ConvertArgs),
    /// Extract test cases from text read on stdin.
    ParseStdin(ParseStdinArgs),
    /// Print quality metrics and recommendations for a document.
    Analyze(AnalyzeArgs),
    /// List, show or create templates.
    Templates(TemplatesArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Documents to convert (.txt, .md, .pdf, .docx, .json, .xml).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Template name (default: the configured default template).
    #[arg(long)]
    template: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
    /// Directory receiving one output file per input instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Include the extraction report.
    #[arg(long)]
    with_report: bool,
    /// Export the extracted cases with provenance instead of a template table.
    #[arg(long)]
    cases: bool,
}

#[derive(Debug, Args)]
struct ParseStdinArgs {
    /// Template name (default: the configured default template).
    #[arg(long)]
    template: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
    /// Include the extraction report.
    #[arg(long)]
    with_report: bool,
    /// Export the extracted cases with provenance instead of a template table.
    #[arg(long)]
    cases: bool,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Document to analyze.
    input: PathBuf,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: AnalyzeFormat,
}

#[derive(Debug, Args)]
struct TemplatesArgs {
    #[command(subcommand)]
    operation: TemplatesOperation,
}

#[derive(Debug, Subcommand)]
enum TemplatesOperation {
    /// List registered templates.
    List,
    /// Show a template's columns and field mappings.
    Show(ShowTemplateArgs),
    /// Create a template from a comma-separated column list.
    Create(CreateTemplateArgs),
}

#[derive(Debug, Args)]
struct ShowTemplateArgs {
    name: String,
}

#[derive(Debug, Args)]
struct CreateTemplateArgs {
    /// Template name.
    #[arg(long)]
    name: String,
    /// Comma-separated column names (e.g. "Story, Steps, Expected").
    #[arg(long)]
    columns: String,
    /// Write the template to this file (.json, otherwise YAML).
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Why a command did not complete.
#[derive(Debug)]
enum Failure {
    /// Hard failure, exit status 1.
    Error(String),
    /// Nothing to work on, exit status 2.
    NoData(String),
}

impl Failure {
    fn message(&self) -> &str {
        match self {
            Self::Error(msg) | Self::NoData(msg) => msg,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Error(_) => "error",
            Self::NoData(_) => "warning",
        }
    }
}

impl From<String> for Failure {
    fn from(msg: String) -> Self {
        Self::Error(msg)
    }
}

impl From<ExtractError> for Failure {
    fn from(err: ExtractError) -> Self {
        if err.is_no_data() {
            Self::NoData(err.to_string())
        } else {
            Self::Error(err.to_string())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Convert(args) => run_convert(&cli, args),
        Command::ParseStdin(args) => run_parse_stdin(&cli, args),
        Command::Analyze(args) => run_analyze(&cli, args),
        Command::Templates(args) => run_templates(&cli, args),
    };

    match result {
        Ok(()) => {}
        Err(Failure::NoData(msg)) => {
            eprintln!("warning: {msg}");
            std::process::exit(2);
        }
        Err(Failure::Error(msg)) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

/// Installs the stderr subscriber. `--verbose` wins over `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Configuration and registry
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<EngineConfig, String> {
    match &cli.config {
        Some(path) => EngineConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display())),
        None => EngineConfig::load_or_default(DEFAULT_CONFIG_FILE)
            .map_err(|e| format!("Failed to load config '{DEFAULT_CONFIG_FILE}': {e}")),
    }
}

fn load_registry(cli: &Cli, config: &EngineConfig) -> Result<TemplateRegistry, String> {
    let mut registry = TemplateRegistry::with_builtins();
    let dirs = config.template_dirs.iter().chain(cli.templates_dir.as_ref());
    for dir in dirs {
        let loaded = registry
            .extend_from_dir(dir)
            .map_err(|e| format!("Failed to load templates from '{}': {e}", dir.display()))?;
        info!(dir = %dir.display(), loaded, "Templates loaded");
    }
    Ok(registry)
}

fn open_session(
    config: &EngineConfig,
    registry: TemplateRegistry,
    template: Option<&str>,
) -> Result<Session, Failure> {
    let mut session = Session::from_config(registry, config)?;
    if let Some(name) = template {
        session.select_template(name)?;
    }
    Ok(session)
}

// ---------------------------------------------------------------------------
// convert / parse-stdin
// ---------------------------------------------------------------------------

/// Rendered output for one input.
struct Converted {
    input: PathBuf,
    table: String,
    report: Option<String>,
}

/// What `convert` and `parse-stdin` print for a session.
#[derive(Debug, Clone, Copy)]
struct RenderOptions {
    format: OutputFormat,
    with_report: bool,
    cases: bool,
}

impl From<&ConvertArgs> for RenderOptions {
    fn from(args: &ConvertArgs) -> Self {
        Self {
            format: args.format,
            with_report: args.with_report,
            cases: args.cases,
        }
    }
}

impl From<&ParseStdinArgs> for RenderOptions {
    fn from(args: &ParseStdinArgs) -> Self {
        Self {
            format: args.format,
            with_report: args.with_report,
            cases: args.cases,
        }
    }
}

fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<(), Failure> {
    let config = load_config(cli)?;
    let registry = load_registry(cli, &config)?;
    // Fail once up front rather than per input.
    open_session(&config, registry.clone(), args.template.as_deref())?;

    let outcomes: Vec<(&PathBuf, Result<Converted, Failure>)> = args
        .inputs
        .par_iter()
        .map(|input| {
            let outcome = convert_one(&config, registry.clone(), args, input);
            (input, outcome)
        })
        .collect();

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir).map_err(|err| {
            format!("Failed to create output directory '{}': {err}", dir.display())
        })?;
    }

    let total = outcomes.len();
    let stems = unique_stems(&args.inputs);
    let mut written = 0usize;
    let mut failures = Vec::new();
    for ((input, outcome), stem) in outcomes.into_iter().zip(&stems) {
        match outcome {
            Ok(converted) => match &args.output {
                Some(dir) => written += write_converted(dir, stem, &converted, args.format)?,
                None => print_converted(&converted, total > 1),
            },
            Err(failure) => failures.push((input, failure)),
        }
    }

    if let Some(dir) = &args.output {
        println!("Wrote {written} file(s) to '{}'.", dir.display());
    }

    if total == 1 {
        if let Some((_, failure)) = failures.pop() {
            return Err(failure);
        }
        return Ok(());
    }
    if failures.is_empty() {
        return Ok(());
    }

    for (input, failure) in &failures {
        eprintln!("{}: {}: {}", failure.prefix(), input.display(), failure.message());
    }
    let summary = format!("{} of {total} input(s) produced no output", failures.len());
    if failures.iter().any(|(_, f)| matches!(f, Failure::Error(_))) {
        Err(Failure::Error(summary))
    } else {
        Err(Failure::NoData(summary))
    }
}

fn convert_one(
    config: &EngineConfig,
    registry: TemplateRegistry,
    args: &ConvertArgs,
    input: &Path,
) -> Result<Converted, Failure> {
    let mut session = open_session(config, registry, args.template.as_deref())?;
    session.load_path(input)?;
    let (table, report) = render_session(&mut session, args.into())?;
    Ok(Converted {
        input: input.to_path_buf(),
        table,
        report,
    })
}

fn run_parse_stdin(cli: &Cli, args: &ParseStdinArgs) -> Result<(), Failure> {
    let config = load_config(cli)?;
    let registry = load_registry(cli, &config)?;
    let mut session = open_session(&config, registry, args.template.as_deref())?;

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    session.load_document(&Document::text(text).with_source("<stdin>"));

    let (table, report) = render_session(&mut session, args.into())?;
    print_converted(
        &Converted {
            input: PathBuf::from("<stdin>"),
            table,
            report,
        },
        false,
    );
    Ok(())
}

/// Previews the loaded extraction and formats the table (or the case set),
/// plus the report when requested. JSON and YAML bundle both into one
/// document.
fn render_session(
    session: &mut Session,
    options: RenderOptions,
) -> Result<(String, Option<String>), Failure> {
    let Some(run) = session.extraction() else {
        return Err(ExtractError::NoDataToPreview.into());
    };
    let report = run.report.clone();
    if run.is_empty() {
        let source = report.source.as_deref().unwrap_or("input");
        return Err(Failure::NoData(format!("'{source}' produced no test cases")));
    }
    for warning in &report.warnings {
        debug!(source = ?report.source, warning = %warning, "Extraction warning");
    }

    let table = session.preview()?;
    let case_set = options
        .cases
        .then(|| session.case_set(chrono::Utc::now().to_rfc3339()));
    let format = options.format;

    if options.with_report && matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        let body = match &case_set {
            Some(set) => Body::Cases(set),
            None => Body::Table(&table),
        };
        return Ok((format_bundle(body, &report, format)?, None));
    }

    let body = match &case_set {
        Some(set) => format_case_set(set, format)?,
        None => format_table(&table, format)?,
    };
    let report = if options.with_report {
        Some(format_report(&report, format)?)
    } else {
        None
    };
    Ok((body, report))
}

/// Main document of a bundled JSON/YAML output.
#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
enum Body<'a> {
    Table(&'a RenderedTable),
    Cases(&'a CaseSet),
}

fn format_bundle(
    body: Body<'_>,
    report: &ExtractionReport,
    format: OutputFormat,
) -> Result<String, String> {
    #[derive(serde::Serialize)]
    struct ConvertOutput<'a> {
        #[serde(flatten)]
        body: Body<'a>,
        report: &'a ExtractionReport,
    }

    let output = ConvertOutput { body, report };
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(&output)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        _ => serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {e}")),
    }
}

fn print_converted(converted: &Converted, with_heading: bool) {
    if with_heading {
        println!("==> {} <==", converted.input.display());
    }
    print!("{}", converted.table);
    if !converted.table.ends_with('\n') {
        println!();
    }
    if let Some(report) = &converted.report {
        println!();
        print!("{report}");
    }
}

fn write_converted(
    dir: &Path,
    stem: &str,
    converted: &Converted,
    format: OutputFormat,
) -> Result<usize, String> {
    let ext = format_extension(format);

    let path = dir.join(format!("{stem}.{ext}"));
    fs::write(&path, &converted.table)
        .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
    let Some(report) = &converted.report else {
        return Ok(1);
    };

    let report_path = dir.join(format!("{stem}.report.{ext}"));
    fs::write(&report_path, report)
        .map_err(|err| format!("Failed to write '{}': {err}", report_path.display()))?;
    Ok(2)
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

fn run_analyze(cli: &Cli, args: &AnalyzeArgs) -> Result<(), Failure> {
    let config = load_config(cli)?;
    let registry = load_registry(cli, &config)?;
    let mut session = open_session(&config, registry, None)?;

    session.load_path(&args.input)?;
    match session.preview() {
        Ok(_) | Err(ExtractError::NoDataToPreview) => {}
        Err(err) => return Err(err.into()),
    }
    let report = session.analyze()?;

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let output = format_quality(&report, args.format.into(), &generated_at)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// templates
// ---------------------------------------------------------------------------

fn run_templates(cli: &Cli, args: &TemplatesArgs) -> Result<(), Failure> {
    let config = load_config(cli)?;
    let mut registry = load_registry(cli, &config)?;

    match &args.operation {
        TemplatesOperation::List => {
            let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(4);
            for template in registry.iter() {
                let marker = if template.name == config.default_template { "*" } else { " " };
                println!(
                    "{marker} {:<width$}  {} ({} columns)",
                    template.name,
                    template.display_name(),
                    template.columns.len()
                );
            }
        }
        TemplatesOperation::Show(show) => {
            let template = registry
                .require(&show.name)
                .map_err(|e| e.to_string())?;
            print!("{}", template.describe());
        }
        TemplatesOperation::Create(create) => {
            let template = registry
                .create_custom(&create.name, &create.columns)
                .map_err(|e| e.to_string())?;
            print!("{}", template.describe());
            if let Some(path) = &create.save {
                save_template(template, path)
                    .map_err(|e| format!("Failed to save template '{}': {e}", path.display()))?;
                println!("\nSaved template '{}' to '{}'.", template.name, path.display());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the file extension for the given output format.
fn format_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::Yaml => "yaml",
        OutputFormat::Markdown => "md",
        OutputFormat::Table => "txt",
        OutputFormat::Csv => "csv",
    }
}

/// Output file stem for an input path: its file stem with unsafe
/// characters replaced.
fn output_stem(input: &Path) -> String {
    let raw = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_filename_segment(&raw)
}

/// Output stems for `inputs`, in order. A stem already taken gets the
/// first free `-2`, `-3`, ... suffix so no two inputs share a file.
fn unique_stems(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let base = output_stem(input);
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{base}-{n}");
                n += 1;
            }
            stem
        })
        .collect()
}

fn sanitize_filename_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            out.push(ch);
        } else {
            out.push('-');
        }
    }
    let cleaned = out.trim_matches('-');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_segment_keeps_safe_chars() {
        assert_eq!(sanitize_filename_segment("requisitos_v2"), "requisitos_v2");
        assert_eq!(sanitize_filename_segment("plano de teste"), "plano-de-teste");
        assert_eq!(sanitize_filename_segment("cenários"), "cenários");
    }

    #[test]
    fn test_sanitize_filename_segment_empty_falls_back() {
        assert_eq!(sanitize_filename_segment(""), "document");
        assert_eq!(sanitize_filename_segment("///"), "document");
    }

    #[test]
    fn test_output_stem_drops_directory_and_extension() {
        assert_eq!(output_stem(Path::new("docs/login flow.pdf")), "login-flow");
    }

    #[test]
    fn test_unique_stems_disambiguate_same_file_name() {
        let inputs = [
            PathBuf::from("a/login.txt"),
            PathBuf::from("b/login.txt"),
            PathBuf::from("login-2.md"),
            PathBuf::from("c/login.json"),
        ];
        assert_eq!(
            unique_stems(&inputs),
            vec!["login", "login-2", "login-2-2", "login-3"]
        );
    }

    #[test]
    fn test_format_extension_csv() {
        assert_eq!(format_extension(OutputFormat::Csv), "csv");
        assert_eq!(format_extension(OutputFormat::Markdown), "md");
    }

    #[test]
    fn test_no_data_errors_become_warnings() {
        assert!(matches!(
            Failure::from(ExtractError::NoDataToAnalyze),
            Failure::NoData(_)
        ));
        assert!(matches!(
            Failure::from(ExtractError::UnsupportedFormat("x.xls".into())),
            Failure::Error(_)
        ));
    }

    #[test]
    fn test_analyze_format_maps_text_to_table() {
        assert_eq!(OutputFormat::from(AnalyzeFormat::Text), OutputFormat::Table);
    }
}
