//! Domain types for source blobs, normalized units, and extracted presentations.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Insertion-ordered metadata attached to a normalized unit.
pub type Metadata = Map<String, Value>;

/// Insertion-ordered mapping from column name to cell value for one row.
pub type RowMap = Map<String, Value>;

/// Raw input handed over by the host: bytes, a MIME type, and an optional origin.
#[derive(Debug, Clone)]
pub struct SourceBlob {
    data: Vec<u8>,
    mimetype: String,
    source: Option<PathBuf>,
}

impl SourceBlob {
    /// Create a blob from raw bytes and a declared MIME type.
    pub fn new(data: impl Into<Vec<u8>>, mimetype: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mimetype: mimetype.into(),
            source: None,
        }
    }

    /// Attach the path or name the bytes came from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Read a file from disk into a blob.
    pub fn from_path(path: impl AsRef<Path>, mimetype: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::new(data, mimetype).with_source(path))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The declared MIME type, as supplied by the host.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The declared MIME type without parameters, lower-cased.
    pub fn essence(&self) -> String {
        crate::mime::essence(&self.mimetype)
    }

    /// The source path or name, if known.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// File name component of the source, if known.
    pub fn file_name(&self) -> Option<&str> {
        self.source
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }

    /// Lower-cased file extension of the source, if known.
    pub fn extension(&self) -> Option<String> {
        self.source
            .as_deref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Metadata fields shared by every unit produced from this blob.
    pub fn base_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(source) = self.source.as_deref() {
            metadata.insert(
                "source".to_string(),
                Value::String(source.to_string_lossy().into_owned()),
            );
        }
        metadata.insert("mimetype".to_string(), Value::String(self.mimetype.clone()));
        metadata
    }
}

/// One normalized output unit: extracted text plus descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedUnit {
    /// Extracted or derived content.
    pub text: String,

    /// Descriptive fields (origin, MIME type, sheet/slide identifiers, counts).
    pub metadata: Metadata,
}

impl NormalizedUnit {
    /// Create a unit from text and metadata.
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Look up a metadata field.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// Represents an entire presentation with its extracted content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: PresentationFormat,

    /// Slides in presentation order.
    pub slides: Vec<ExtractedSlide>,
}

impl Presentation {
    /// Create a new presentation with the given filename and format.
    pub fn new(filename: impl Into<String>, format: PresentationFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        self.slides.push(slide);
    }

    /// Slide contents joined by a blank line, in slide order.
    pub fn full_text(&self) -> String {
        self.slides
            .iter()
            .map(ExtractedSlide::content)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }

    /// Short lowercase label used in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Ppt => "ppt",
        }
    }
}

/// A single extracted slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Text-bearing shapes in reading order.
    pub shapes: Vec<SlideShape>,
}

impl ExtractedSlide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a body shape. Shapes without text are skipped.
    pub fn add_shape(&mut self, text: impl Into<String>) {
        self.push(SlideShape::new(text, false));
    }

    /// Add a shape flagged as a title placeholder.
    pub fn add_title(&mut self, text: impl Into<String>) {
        self.push(SlideShape::new(text, true));
    }

    fn push(&mut self, shape: SlideShape) {
        if !shape.text.trim().is_empty() {
            self.shapes.push(shape);
        }
    }

    /// Index of the first shape flagged as title.
    fn title_index(&self) -> Option<usize> {
        self.shapes.iter().position(|s| s.is_title)
    }

    /// Text of the first title shape, or an empty string.
    pub fn title(&self) -> &str {
        self.title_index()
            .map(|i| self.shapes[i].text.as_str())
            .unwrap_or("")
    }

    /// Newline-joined text of every shape except the chosen title.
    pub fn content(&self) -> String {
        let title = self.title_index();
        self.shapes
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != title)
            .map(|(_, s)| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Label used as the key of the per-slide metadata mapping.
    pub fn label(&self) -> String {
        format!("Slide {}", self.number)
    }
}

/// Text content from a shape or text frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideShape {
    /// The actual text content.
    pub text: String,

    /// Whether the shape is a title placeholder.
    pub is_title: bool,
}

impl SlideShape {
    /// Create new slide shape text.
    pub fn new(text: impl Into<String>, is_title: bool) -> Self {
        Self {
            text: text.into(),
            is_title,
        }
    }
}
