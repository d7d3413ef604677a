//! The working set and the operations a user performs on it.
//!
//! A [`Session`] owns a [`TemplateRegistry`], the raw extraction of the last
//! loaded document and the working set derived from it. The raw extraction
//! is never modified by edits, so [`Session::reset_edits`] can always
//! restore it.
//!
//! Loading is atomic: the new extraction replaces the old one only after the
//! document was read and extracted completely. A failed load leaves the
//! session untouched.

use std::path::Path;

use casegen_core::{CaseSet, RenderedTable, Template, TestCase};
use casegen_templates::{DEFAULT_TEMPLATE, EngineConfig, TemplateRegistry};
use tracing::{debug, info};

use crate::adapters::{Document, DocumentLoader};
use crate::error::{ExtractError, Result};
use crate::quality::{QualityReport, analyze};
use crate::report::ExtractionRun;

/// Single-user editing session over one document at a time.
///
/// # Examples
///
/// ```
/// use casegen_extract::{Document, Session};
/// use casegen_templates::TemplateRegistry;
///
/// let mut session = Session::new(TemplateRegistry::with_builtins());
/// session.load_document(&Document::text("Cenário: login\nEntão entra"));
///
/// let table = session.preview().unwrap();
/// assert_eq!(table.header[1], "Cenário");
/// assert_eq!(table.rows[0][1], "login");
///
/// assert!(session.apply_edit(0, 4, "entra no painel").unwrap());
/// assert_eq!(session.working_set()[0].then, "entra no painel");
/// assert_eq!(session.extraction().unwrap().cases[0].then, "entra");
/// ```
#[derive(Debug)]
pub struct Session {
    registry: TemplateRegistry,
    loader: DocumentLoader,
    template: String,
    extraction: Option<ExtractionRun>,
    working_set: Vec<TestCase>,
}

impl Session {
    /// Creates a session selecting `padrao_gherkin`, or the first template
    /// in name order when the registry has no such entry.
    pub fn new(registry: TemplateRegistry) -> Self {
        let template = if registry.contains(DEFAULT_TEMPLATE) {
            DEFAULT_TEMPLATE.to_string()
        } else {
            registry
                .names()
                .first()
                .map_or_else(|| DEFAULT_TEMPLATE.to_string(), |name| name.to_string())
        };
        Self {
            registry,
            loader: DocumentLoader::default(),
            template,
            extraction: None,
            working_set: Vec::new(),
        }
    }

    /// Creates a session using the configured converters and default
    /// template.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Template`] when the configured default
    /// template is not registered.
    pub fn from_config(registry: TemplateRegistry, config: &EngineConfig) -> Result<Self> {
        let mut session = Self::new(registry).with_loader(DocumentLoader::new(config.converters.clone()));
        session.select_template(&config.default_template)?;
        Ok(session)
    }

    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Mutable registry access, e.g. for adding custom templates.
    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    pub fn template_name(&self) -> &str {
        &self.template
    }

    /// The currently selected template.
    pub fn template(&self) -> Result<&Template> {
        Ok(self.registry.require(&self.template)?)
    }

    /// Selects the template used by [`render`](Self::render),
    /// [`apply_edit`](Self::apply_edit) and [`export`](Self::export).
    ///
    /// An unknown name leaves the current selection in place.
    pub fn select_template(&mut self, name: &str) -> Result<&Template> {
        self.registry.require(name)?;
        debug!(template = name, "Template selected");
        self.template = name.to_string();
        self.template()
    }

    /// Extracts `document` and stores the result as the raw extraction.
    ///
    /// The working set is left as is until the next [`preview`](Self::preview).
    pub fn load_document(&mut self, document: &Document) -> &ExtractionRun {
        let run = crate::extract(document);
        self.extraction.insert(run)
    }

    /// Loads and extracts a file.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnsupportedFormat`] or
    /// [`ExtractError::ExtractionFailure`]; the session is unchanged.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<&ExtractionRun> {
        let document = self.loader.load(path)?;
        Ok(self.load_document(&document))
    }

    /// The raw extraction of the last loaded document.
    pub fn extraction(&self) -> Option<&ExtractionRun> {
        self.extraction.as_ref()
    }

    pub fn working_set(&self) -> &[TestCase] {
        &self.working_set
    }

    /// Copies the raw extraction into the working set and renders it.
    ///
    /// # Errors
    ///
    /// [`ExtractError::NoDataToPreview`] when nothing has been extracted.
    pub fn preview(&mut self) -> Result<RenderedTable> {
        let cases = match &self.extraction {
            Some(run) if !run.cases.is_empty() => run.cases.clone(),
            _ => return Err(ExtractError::NoDataToPreview),
        };
        info!(cases = cases.len(), template = %self.template, "Preview generated");
        self.working_set = cases;
        self.render()
    }

    /// Renders the working set through the current template.
    pub fn render(&self) -> Result<RenderedTable> {
        Ok(self.template()?.render(&self.working_set))
    }

    /// Writes `value` into the cell at (`case_index`, `column_index`) of the
    /// rendered table. Returns `Ok(false)` when the cell does not exist or
    /// its column has no field.
    pub fn apply_edit(
        &mut self,
        case_index: usize,
        column_index: usize,
        value: impl Into<String>,
    ) -> Result<bool> {
        let template = self.registry.require(&self.template)?;
        Ok(template.apply_edit(&mut self.working_set, case_index, column_index, value))
    }

    /// Rows for the tabular export.
    ///
    /// # Errors
    ///
    /// [`ExtractError::NoDataToExport`] when the working set is empty.
    pub fn export(&self) -> Result<RenderedTable> {
        if self.working_set.is_empty() {
            return Err(ExtractError::NoDataToExport);
        }
        self.render()
    }

    /// Quality metrics and recommendations for the working set.
    ///
    /// # Errors
    ///
    /// [`ExtractError::NoDataToAnalyze`] when the working set is empty.
    pub fn analyze(&self) -> Result<QualityReport> {
        if self.working_set.is_empty() {
            return Err(ExtractError::NoDataToAnalyze);
        }
        Ok(analyze(&self.working_set))
    }

    /// Discards edits by copying the raw extraction back into the working
    /// set. Returns the number of cases restored.
    pub fn reset_edits(&mut self) -> Result<usize> {
        let Some(run) = self.extraction.as_ref().filter(|run| !run.cases.is_empty()) else {
            return Err(ExtractError::NoDataToPreview);
        };
        self.working_set = run.cases.clone();
        Ok(self.working_set.len())
    }

    /// Drops the raw extraction and the working set.
    pub fn clear(&mut self) {
        self.extraction = None;
        self.working_set.clear();
    }

    /// The working set bundled with provenance from the last extraction.
    pub fn case_set(&self, generated_at: impl Into<String>) -> CaseSet {
        let mut set = CaseSet::new(generated_at);
        if let Some(run) = &self.extraction {
            set.source = run.report.source.clone();
            set.format = Some(run.report.format);
            set.producer = Some(run.report.producer);
        }
        set.cases = self.working_set.clone();
        set
    }
}
