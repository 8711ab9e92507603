//! Error types for document normalization.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a source blob.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The declared MIME type is not handled by the converter or registry.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// An optional backend was compiled out.
    #[error("Missing optional dependency: {0}")]
    MissingDependency(String),

    /// Failed to parse the PPTX file structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Failed to parse the legacy PPT file structure.
    #[error("PPT parsing error: {0}")]
    PptParseError(String),

    /// Failed to parse a legacy Word document.
    #[error("DOC parsing error: {0}")]
    DocParseError(String),

    /// Failed to parse an email message.
    #[error("Email parsing error: {0}")]
    EmailParseError(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// ZIP archive error (for OOXML containers).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for OOXML parts).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// OLE/CFB container error (for PPT/DOC).
    #[error("OLE/CFB error: {0}")]
    CfbError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an `UnsupportedFormat` error for a converter/MIME mismatch.
    pub fn unsupported(converter: &str, mimetype: &str) -> Self {
        Self::UnsupportedFormat(format!(
            "{} converter cannot handle MIME type '{}'",
            converter, mimetype
        ))
    }

    /// Whether this error is a dispatch-layer wiring error.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_))
    }
}
