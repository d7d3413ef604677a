//! Engine configuration.
//!
//! Defines the YAML-serializable configuration that selects the default
//! template, extra template directories, and the external converters used
//! to turn PDF and Word documents into plain text.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! default_template: padrao_gherkin
//! template_dirs:
//!   - ./templates
//! converters:
//!   pdf:
//!     program: pdftotext
//!     args: ["-layout", "{input}", "-"]
//!   word:
//!     program: pandoc
//!     args: ["-t", "plain", "{input}"]
//!   timeout_ms: 30000
//! ```
//!
//! Every section is optional; missing keys take the defaults shown above.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::registry::DEFAULT_TEMPLATE;

/// Placeholder replaced by the input path in converter arguments.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// An external program that prints a document's text on stdout.
///
/// # Examples
///
/// ```
/// # use casegen_templates::ConverterCommand;
/// let cmd = ConverterCommand::new("pdftotext", ["-layout", "{input}", "-"]);
/// assert_eq!(cmd.argv("a.pdf"), vec!["-layout", "a.pdf", "-"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ConverterCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments with every `{input}` placeholder substituted.
    ///
    /// When no argument mentions the placeholder the input path is appended.
    pub fn argv(&self, input: &str) -> Vec<String> {
        if !self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            let mut args = self.args.clone();
            args.push(input.to_string());
            return args;
        }
        self.args
            .iter()
            .map(|arg| arg.replace(INPUT_PLACEHOLDER, input))
            .collect()
    }
}

/// Converters for the binary document formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub pdf: ConverterCommand,
    pub word: ConverterCommand,
    /// Upper bound for a single conversion, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            pdf: ConverterCommand::new("pdftotext", ["-layout", INPUT_PLACEHOLDER, "-"]),
            word: ConverterCommand::new("pandoc", ["-t", "plain", INPUT_PLACEHOLDER]),
            timeout_ms: 30_000,
        }
    }
}

/// Top-level engine configuration.
///
/// Loaded from a YAML file (typically `casegen.yml`) by the CLI's
/// `--config` option.
///
/// # Examples
///
/// ```
/// use casegen_templates::EngineConfig;
///
/// let config: EngineConfig = serde_yaml::from_str("default_template: simple\n").unwrap();
/// assert_eq!(config.default_template, "simple");
/// assert_eq!(config.converters.pdf.program, "pdftotext");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Template selected when none is given explicitly.
    pub default_template: String,
    /// Directories scanned for additional template files, in order.
    pub template_dirs: Vec<PathBuf>,
    pub converters: ConverterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            default_template: DEFAULT_TEMPLATE.to_string(),
            template_dirs: Vec::new(),
            converters: ConverterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
