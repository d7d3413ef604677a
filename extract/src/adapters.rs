//! Document adapters: turn files into text or trees for the engine.
//!
//! Format is chosen by file extension. Plain text is decoded as UTF-8 with
//! a Latin-1 fallback; PDF and Word documents are converted by an external
//! program configured in [`ConverterConfig`]; JSON and XML are parsed into
//! trees.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use casegen_core::SourceFormat;
use casegen_templates::{ConverterCommand, ConverterConfig};
use serde_json::Value;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{AdapterError, ExtractError};
use crate::tree::XmlElement;

/// Parsed content handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    Text(String),
    Json(Value),
    Xml(XmlElement),
}

/// A loaded document ready for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path or label used in reports.
    pub source: Option<String>,
    pub format: SourceFormat,
    pub content: DocumentContent,
}

impl Document {
    /// Plain text, routed to the line parser.
    pub fn text(text: impl Into<String>) -> Self {
        Self::converted_text(SourceFormat::Text, text)
    }

    /// Text produced by converting a document of `format`.
    pub fn converted_text(format: SourceFormat, text: impl Into<String>) -> Self {
        Self {
            source: None,
            format,
            content: DocumentContent::Text(text.into()),
        }
    }

    pub fn json(value: Value) -> Self {
        Self {
            source: None,
            format: SourceFormat::Json,
            content: DocumentContent::Json(value),
        }
    }

    pub fn xml(root: XmlElement) -> Self {
        Self {
            source: None,
            format: SourceFormat::Xml,
            content: DocumentContent::Xml(root),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Maps a file extension (case-insensitive) to a document format.
///
/// # Examples
///
/// ```
/// use casegen_core::SourceFormat;
/// use casegen_extract::adapters::detect_format;
///
/// assert_eq!(detect_format("notes.TXT".as_ref()).unwrap(), SourceFormat::Text);
/// assert_eq!(detect_format("plan.docx".as_ref()).unwrap(), SourceFormat::Word);
/// assert!(detect_format("sheet.xlsx".as_ref()).is_err());
/// ```
pub fn detect_format(path: &Path) -> Result<SourceFormat, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "text" | "md" => Ok(SourceFormat::Text),
        "pdf" => Ok(SourceFormat::Pdf),
        "docx" | "doc" => Ok(SourceFormat::Word),
        "json" => Ok(SourceFormat::Json),
        "xml" => Ok(SourceFormat::Xml),
        _ => Err(ExtractError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Loads documents from disk using the configured converters.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    converters: ConverterConfig,
}

impl DocumentLoader {
    pub fn new(converters: ConverterConfig) -> Self {
        Self { converters }
    }

    /// Detects the format of `path` and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedFormat`] for an unknown extension
    /// and [`ExtractError::ExtractionFailure`] when reading, converting or
    /// parsing fails.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, ExtractError> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        debug!(path = %path.display(), format = %format, "Loading document");

        let content = self
            .read_content(path, format)
            .map_err(|source| ExtractError::ExtractionFailure {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Document {
            source: Some(path.display().to_string()),
            format,
            content,
        })
    }

    fn read_content(&self, path: &Path, format: SourceFormat) -> Result<DocumentContent, AdapterError> {
        let timeout = Duration::from_millis(self.converters.timeout_ms);
        match format {
            SourceFormat::Text => Ok(DocumentContent::Text(read_text_file(path)?)),
            SourceFormat::Pdf => Ok(DocumentContent::Text(run_converter(
                &self.converters.pdf,
                path,
                timeout,
            )?)),
            SourceFormat::Word => Ok(DocumentContent::Text(run_converter(
                &self.converters.word,
                path,
                timeout,
            )?)),
            SourceFormat::Json => Ok(DocumentContent::Json(parse_json(&read_text_file(path)?)?)),
            SourceFormat::Xml => Ok(DocumentContent::Xml(parse_xml(&read_text_file(path)?)?)),
        }
    }
}

/// Reads a file as UTF-8, falling back to Latin-1.
pub fn read_text_file(path: &Path) -> Result<String, AdapterError> {
    let bytes = std::fs::read(path)?;
    Ok(decode_text(bytes))
}

/// Decodes bytes as UTF-8, or as Latin-1 when they are not valid UTF-8.
///
/// # Examples
///
/// ```
/// use casegen_extract::adapters::decode_text;
///
/// assert_eq!(decode_text("ação".as_bytes().to_vec()), "ação");
/// assert_eq!(decode_text(vec![0x61, 0xe7, 0xe3, 0x6f]), "ação");
/// ```
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("Input is not valid UTF-8, decoding as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

pub fn parse_json(text: &str) -> Result<Value, AdapterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(serde_json::from_str(text)?)
}

pub fn parse_xml(text: &str) -> Result<XmlElement, AdapterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(XmlElement::parse(text)?)
}

/// Runs an external converter and returns its stdout as text.
///
/// The process is killed once `timeout` elapses.
pub fn run_converter(
    command: &ConverterCommand,
    input: &Path,
    timeout: Duration,
) -> Result<String, AdapterError> {
    let argv = command.argv(&input.display().to_string());
    debug!(program = %command.program, argv = ?argv, "Running converter");

    let mut child = Command::new(&command.program)
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AdapterError::Converter {
            program: command.program.clone(),
            detail: format!("could not start: {e}"),
        })?;

    // Drain both pipes in the background so a full pipe buffer cannot
    // block the child before it exits.
    let stdout_thread = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let result = pipe.read_to_end(&mut buf);
            (buf, result)
        })
    });
    let stderr_thread = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let result = pipe.read_to_end(&mut buf);
            (buf, result)
        })
    });

    let Some(status) = child.wait_timeout(timeout)? else {
        warn!(
            program = %command.program,
            timeout_ms = timeout.as_millis() as u64,
            "Converter timed out, killing process"
        );
        let _ = child.kill();
        let _ = child.wait();
        return Err(AdapterError::Timeout {
            program: command.program.clone(),
            timeout,
        });
    };

    let (stdout, stdout_result) = stdout_thread
        .and_then(|t| t.join().ok())
        .unwrap_or((Vec::new(), Ok(0)));
    stdout_result?;
    let stderr = stderr_thread
        .and_then(|t| t.join().ok())
        .map(|(buf, _)| buf)
        .unwrap_or_default();

    if !status.success() {
        let message = String::from_utf8_lossy(&stderr).trim().to_string();
        let detail = if message.is_empty() {
            format!("exited with {status}")
        } else {
            format!("exited with {status}: {message}")
        };
        return Err(AdapterError::Converter {
            program: command.program.clone(),
            detail,
        });
    }

    Ok(decode_text(stdout))
}
