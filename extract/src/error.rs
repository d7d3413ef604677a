//! Error types for document loading and session operations.
//!
//! Content never produces an error: malformed or unrecognized text degrades
//! to fallback synthesis. Errors are reserved for I/O, unsupported inputs
//! and operations attempted on an empty working set.

use std::path::PathBuf;
use std::time::Duration;

use casegen_templates::RegistryError;
use thiserror::Error;

/// Failures raised by the document adapters before extraction starts.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// External converter could not run or exited unsuccessfully.
    #[error("converter '{program}' failed: {detail}")]
    Converter { program: String, detail: String },

    /// External converter exceeded its time budget and was killed.
    #[error("converter '{program}' timed out after {}ms", .timeout.as_millis())]
    Timeout { program: String, timeout: Duration },
}

/// Errors surfaced by the extraction engine and the session.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File extension is not one of the recognized document formats.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Reading or decoding the document failed; state is left unchanged.
    #[error("failed to extract '{}': {source}", .path.display())]
    ExtractionFailure {
        path: PathBuf,
        #[source]
        source: AdapterError,
    },

    #[error("no data to preview; load a document first")]
    NoDataToPreview,

    #[error("no data to export; generate a preview first")]
    NoDataToExport,

    #[error("no data to analyze; generate a preview first")]
    NoDataToAnalyze,

    #[error(transparent)]
    Template(#[from] RegistryError),
}

impl ExtractError {
    /// `true` for the empty-working-set kinds, which are warnings rather
    /// than failures.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            Self::NoDataToPreview | Self::NoDataToExport | Self::NoDataToAnalyze
        )
    }
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_kinds() {
        assert!(ExtractError::NoDataToPreview.is_no_data());
        assert!(ExtractError::NoDataToAnalyze.is_no_data());
        assert!(!ExtractError::UnsupportedFormat("a.xls".into()).is_no_data());
    }

    #[test]
    fn test_timeout_message() {
        let err = AdapterError::Timeout {
            program: "pdftotext".into(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "converter 'pdftotext' timed out after 1500ms");
    }

    #[test]
    fn test_extraction_failure_names_path() {
        let err = ExtractError::ExtractionFailure {
            path: PathBuf::from("cases.json"),
            source: AdapterError::Converter {
                program: "x".into(),
                detail: "boom".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to extract 'cases.json': converter 'x' failed: boom"
        );
    }
}
