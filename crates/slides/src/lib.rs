//! Presentation converter.
//!
//! Detects the container (OOXML or legacy OLE/CFB) from the magic bytes,
//! falls back to the declared MIME type, and flattens the deck into a single
//! normalized unit:
//!
//! - `text`: slide contents joined by a blank line, in slide order
//! - `metadata.slides`: `"Slide N"` → `{title, content}`

use docunits_core::{
    mime, Converter, Error, Presentation, PresentationFormat, NormalizedUnit, Result, SourceBlob,
    UnitIter,
};
use docunits_ppt::PptParser;
use docunits_pptx::PptxParser;
use serde_json::{json, Map, Value};
use std::io::Cursor;

const SUPPORTED_TYPES: &[&str] = &[mime::PPT, mime::PPTX, mime::PPT_LEGACY];

/// Converter for slide decks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentationConverter;

impl PresentationConverter {
    /// Create a new presentation converter.
    pub fn new() -> Self {
        Self
    }

    /// Decide which backend parses the blob.
    fn detect_format(&self, blob: &SourceBlob) -> PresentationFormat {
        PresentationFormat::from_magic(blob.as_bytes())
            .or_else(|| blob.extension().as_deref().and_then(PresentationFormat::from_extension))
            .unwrap_or_else(|| {
                if blob.essence() == mime::PPTX {
                    PresentationFormat::Pptx
                } else {
                    PresentationFormat::Ppt
                }
            })
    }

    /// Parse the deck with the backend matching its container.
    pub fn parse(&self, blob: &SourceBlob) -> Result<Presentation> {
        self.ensure_accepts(blob)?;

        let filename = blob.file_name().unwrap_or("unknown");
        let reader = Cursor::new(blob.as_bytes());

        match self.detect_format(blob) {
            PresentationFormat::Pptx => {
                log::debug!("Parsing '{}' as PPTX", filename);
                PptxParser::new().parse(reader, filename)
            }
            PresentationFormat::Ppt => {
                log::debug!("Parsing '{}' as legacy PPT", filename);
                PptParser::new().parse(reader, filename)
            }
        }
    }

    /// Flatten a parsed presentation into one unit.
    fn to_unit(&self, blob: &SourceBlob, presentation: &Presentation) -> NormalizedUnit {
        let mut slides = Map::new();
        for slide in &presentation.slides {
            slides.insert(
                slide.label(),
                json!({ "title": slide.title(), "content": slide.content() }),
            );
        }

        let mut metadata = blob.base_metadata();
        metadata.insert("format".to_string(), Value::from(presentation.format.as_str()));
        metadata.insert("slide_count".to_string(), Value::from(presentation.slides.len()));
        metadata.insert("slides".to_string(), Value::Object(slides));

        NormalizedUnit::new(presentation.full_text(), metadata)
    }
}

impl Converter for PresentationConverter {
    fn name(&self) -> &str {
        "presentation"
    }

    fn supported_types(&self) -> &[&str] {
        SUPPORTED_TYPES
    }

    fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
        self.ensure_accepts(blob)?;
        Ok(Box::new(std::iter::once_with(move || {
            let presentation = self.parse(blob)?;
            log::debug!("Extracted {} slides", presentation.slides.len());
            Ok(self.to_unit(blob, &presentation))
        })))
    }
}

/// Convenience wrapper for one-shot conversion.
pub fn convert_presentation(blob: &SourceBlob) -> Result<NormalizedUnit> {
    let mut units = PresentationConverter::new().convert(blob)?;
    units
        .pop()
        .ok_or_else(|| Error::CorruptedFile("presentation produced no unit".to_string()))
}
