//! Template registry with built-ins, file loading and fallback chains.
//!
//! Provides [`TemplateRegistry`], an explicit caller-owned collection of
//! [`Template`]s keyed by name, and [`RegistryBuilder`] for constructing a
//! registry from multiple sources with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use casegen_templates::TemplateRegistry;
//!
//! // The three built-in templates
//! let registry = TemplateRegistry::with_builtins();
//! assert!(registry.get("padrao_gherkin").is_some());
//!
//! // A directory of YAML/JSON template files
//! let registry = TemplateRegistry::from_dir("templates/").unwrap();
//!
//! // A fallback chain: first source that loads wins
//! let registry = TemplateRegistry::builder()
//!     .from_dir("templates/")
//!     .from_file("team-templates.yaml")
//!     .with_builtins()
//!     .build()
//!     .unwrap();
//! ```
//!
//! Names are kept in a `BTreeMap`, so [`names`](TemplateRegistry::names)
//! is always sorted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use casegen_core::{CaseField, Template, TemplateIssue, validate_template};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

/// Key of the template selected when nothing else is configured.
pub const DEFAULT_TEMPLATE: &str = "padrao_gherkin";

/// Describes where a [`TemplateRegistry`] was loaded from.
#[derive(Debug, Clone)]
pub enum RegistrySource {
    /// The compiled-in templates.
    Builtin,
    /// A directory of template files.
    Directory(PathBuf),
    /// A single template file.
    File(PathBuf),
    /// Assembled from several sources.
    Multiple(Vec<RegistrySource>),
}

/// On-disk shape of a template file: one template or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TemplateDocument {
    Many(Vec<Template>),
    One(Template),
}

impl TemplateDocument {
    fn into_templates(self) -> Vec<Template> {
        match self {
            Self::Many(templates) => templates,
            Self::One(template) => vec![template],
        }
    }
}

/// The templates shipped with the tool.
///
/// None of them aliases two fields onto one column.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template::new(
            "padrao_gherkin",
            ["Historia/Requisito", "Cenário", "Dado", "Quando", "Então"],
        )
        .with_title("Padrão Gherkin")
        .with_mapping(CaseField::Requirement, "Historia/Requisito")
        .with_mapping(CaseField::Scenario, "Cenário")
        .with_mapping(CaseField::Given, "Dado")
        .with_mapping(CaseField::When, "Quando")
        .with_mapping(CaseField::Then, "Então"),
        Template::new(
            "teste_detalhado",
            [
                "ID",
                "Requisito",
                "Cenário",
                "Pré-condições",
                "Passos",
                "Resultado Esperado",
                "Prioridade",
            ],
        )
        .with_title("Teste Detalhado")
        .with_mapping(CaseField::Requirement, "Requisito")
        .with_mapping(CaseField::Scenario, "Cenário")
        .with_mapping(CaseField::Given, "Pré-condições")
        .with_mapping(CaseField::When, "Passos")
        .with_mapping(CaseField::Then, "Resultado Esperado"),
        Template::new(
            "simple",
            ["Requisito", "Descrição Teste", "Entrada", "Saída Esperada"],
        )
        .with_title("Simples")
        .with_mapping(CaseField::Requirement, "Requisito")
        .with_mapping(CaseField::Scenario, "Descrição Teste")
        .with_mapping(CaseField::Given, "Entrada")
        .with_mapping(CaseField::Then, "Saída Esperada"),
    ]
}

/// Caller-owned collection of templates keyed by name.
///
/// # Examples
///
/// ```
/// use casegen_templates::TemplateRegistry;
///
/// let mut registry = TemplateRegistry::with_builtins();
/// assert_eq!(registry.names(), vec!["padrao_gherkin", "simple", "teste_detalhado"]);
///
/// let custom = registry.create_custom("mine", "Story, Steps").unwrap();
/// assert_eq!(custom.columns, vec!["Story", "Steps"]);
/// assert!(registry.contains("mine"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
    source: RegistrySource,
}

impl TemplateRegistry {
    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Creates a registry with no templates.
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
            source: RegistrySource::Builtin,
        }
    }

    /// Creates a registry holding the [built-in templates](builtin_templates).
    pub fn with_builtins() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|template| (template.name.clone(), template))
            .collect();
        Self {
            templates,
            source: RegistrySource::Builtin,
        }
    }

    /// Loads templates from a directory of `*.yaml`, `*.yml` and `*.json`
    /// files. Each file holds one template or a list of templates.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory cannot be read,
    /// a parse error for malformed files, or
    /// [`RegistryError::InvalidTemplate`] for a template without name or
    /// columns.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut registry = Self::empty();
        registry.extend_from_dir(path)?;
        registry.source = RegistrySource::Directory(path.to_path_buf());
        Ok(registry)
    }

    /// Loads templates from a single YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Same as [`from_dir`](Self::from_dir), for one file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut registry = Self::empty();
        registry.extend_from_file(path)?;
        registry.source = RegistrySource::File(path.to_path_buf());
        Ok(registry)
    }

    /// Adds every template found in `path`, replacing same-named entries.
    /// Returns the number of templates loaded.
    ///
    /// Files are processed in name order so later files win deterministically.
    pub fn extend_from_dir(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if is_template_file(&file_path) {
                files.push(file_path);
            }
        }
        files.sort();

        let mut loaded = 0;
        for file in files {
            loaded += self.extend_from_file(&file)?;
        }
        debug!(dir = %path.display(), loaded, "Loaded template directory");
        self.mark_extended(RegistrySource::Directory(path.to_path_buf()));
        Ok(loaded)
    }

    /// Adds every template found in the file at `path`.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let document: TemplateDocument = if has_extension(path, "json") {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };

        let templates = document.into_templates();
        let count = templates.len();
        for template in templates {
            self.insert(template)?;
        }
        debug!(file = %path.display(), count, "Loaded template file");
        Ok(count)
    }

    /// Inserts a template, replacing any entry with the same name.
    ///
    /// Returns the replaced template, if any. Tolerated validation findings
    /// (aliased or missing columns) are logged and accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidTemplate`] when the template has an
    /// empty name or no columns.
    pub fn insert(&mut self, template: Template) -> Result<Option<Template>> {
        let issues = validate_template(&template);
        if let Some(fatal) = issues.iter().find(|issue| issue.is_fatal()) {
            return Err(RegistryError::InvalidTemplate(format!(
                "'{}': {fatal}",
                template.name
            )));
        }
        for issue in &issues {
            log_tolerated_issue(&template.name, issue);
        }
        Ok(self.templates.insert(template.name.clone(), template))
    }

    /// Builds a template from a comma-separated column list and registers it.
    ///
    /// Columns are trimmed and blank entries dropped; fields map onto columns
    /// positionally (see [`Template::from_columns`]).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidTemplate`] when `name` is blank or no
    /// column survives trimming.
    pub fn create_custom(&mut self, name: &str, columns: &str) -> Result<&Template> {
        let name = name.trim();
        let columns: Vec<&str> = columns
            .split(',')
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .collect();
        if name.is_empty() || columns.is_empty() {
            return Err(RegistryError::InvalidTemplate(
                "template name and at least one column are required".to_string(),
            ));
        }

        let template = Template::from_columns(name, columns).with_title(name);
        self.insert(template)?;
        self.require(name)
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Looks up a template by name, failing with
    /// [`RegistryError::UnknownTemplate`] when absent.
    pub fn require(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTemplate(name.to_string()))
    }

    /// Removes and returns a template.
    pub fn remove(&mut self, name: &str) -> Option<Template> {
        self.templates.remove(name)
    }

    /// Returns `true` if a template named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the registry holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Iterates over templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    fn mark_extended(&mut self, added: RegistrySource) {
        let previous = std::mem::replace(&mut self.source, RegistrySource::Builtin);
        self.source = match previous {
            RegistrySource::Multiple(mut sources) => {
                sources.push(added);
                RegistrySource::Multiple(sources)
            }
            other => RegistrySource::Multiple(vec![other, added]),
        };
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Writes one template to `path` as JSON (`.json`) or YAML (anything else).
pub fn save_template(template: &Template, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let raw = if has_extension(path, "json") {
        serde_json::to_string_pretty(template)?
    } else {
        serde_yaml::to_string(template)?
    };
    std::fs::write(path, raw)?;
    Ok(())
}

fn log_tolerated_issue(name: &str, issue: &TemplateIssue) {
    match issue {
        TemplateIssue::AliasedColumn { .. } => {
            debug!(template = name, issue = %issue, "Template aliases fields onto one column");
        }
        _ => warn!(template = name, issue = %issue, "Template accepted with validation finding"),
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_template_file(path: &Path) -> bool {
    path.is_file()
        && (has_extension(path, "yaml") || has_extension(path, "yml") || has_extension(path, "json"))
}

/// Builder for constructing a [`TemplateRegistry`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`RegistryError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use casegen_templates::TemplateRegistry;
///
/// let registry = TemplateRegistry::builder()
///     .from_dir("/etc/casegen/templates/")
///     .with_builtins()
///     .build()
///     .unwrap();
/// ```
pub struct RegistryBuilder {
    sources: Vec<RegistrySource>,
}

impl RegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds the built-in templates as a source. Always loads.
    pub fn with_builtins(mut self) -> Self {
        self.sources.push(RegistrySource::Builtin);
        self
    }

    /// Adds a directory of template files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Directory(path.into()));
        self
    }

    /// Adds a single template file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::File(path.into()));
        self
    }

    /// Attempts to load templates from configured sources in order.
    ///
    /// A source that loads but yields no templates counts as a failure, so
    /// an empty directory falls through to the next source.
    pub fn build(self) -> Result<TemplateRegistry> {
        if self.sources.is_empty() {
            return Err(RegistryError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                RegistrySource::Builtin => Ok(TemplateRegistry::with_builtins()),
                RegistrySource::Directory(path) => TemplateRegistry::from_dir(path),
                RegistrySource::File(path) => TemplateRegistry::from_file(path),
                RegistrySource::Multiple(_) => continue,
            };

            match result {
                Ok(mut registry) if !registry.is_empty() => {
                    registry.source = RegistrySource::Multiple(all_sources);
                    return Ok(registry);
                }
                Ok(_) => debug!(source = ?source, "Template source is empty, trying next"),
                Err(e) => debug!(source = ?source, error = %e, "Template source failed, trying next"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
