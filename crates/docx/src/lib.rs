//! Word converter for OOXML and legacy binary word-processing documents.
//!
//! Emits a single unit whose text is the document's paragraphs, one per line.

pub mod parser;

use docunits_core::{mime, Converter, NormalizedUnit, Result, SourceBlob, UnitIter};
use docunits_doc::DocParser;
use serde_json::Value;
use std::io::Cursor;

const SUPPORTED_TYPES: &[&str] = &[mime::DOCX, mime::MSWORD];

const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container of a Word document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// Office Open XML (`.docx`).
    Docx,
    /// Word 97-2003 binary (`.doc`).
    Doc,
}

impl WordFormat {
    /// Magic bytes decide; the declared MIME type is the fallback.
    pub fn detect(blob: &SourceBlob) -> Self {
        let bytes = blob.as_bytes();
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Docx
        } else if bytes.starts_with(CFB_MAGIC) || blob.essence() == mime::MSWORD {
            Self::Doc
        } else {
            Self::Docx
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Doc => "doc",
        }
    }
}

/// Converter for `.docx` and `.doc` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordConverter;

impl WordConverter {
    pub fn new() -> Self {
        Self
    }

    fn to_unit(&self, blob: &SourceBlob) -> Result<NormalizedUnit> {
        let format = WordFormat::detect(blob);
        let reader = Cursor::new(blob.as_bytes());
        let paragraphs = match format {
            WordFormat::Docx => parser::read_paragraphs(reader)?,
            WordFormat::Doc => DocParser::new().parse(reader)?,
        };
        log::debug!("Extracted {} paragraphs from {}", paragraphs.len(), format.as_str());

        let mut metadata = blob.base_metadata();
        metadata.insert("format".to_string(), Value::from(format.as_str()));
        metadata.insert("paragraphs".to_string(), Value::from(paragraphs.len()));
        Ok(NormalizedUnit::new(paragraphs.join("\n"), metadata))
    }
}

impl Converter for WordConverter {
    fn name(&self) -> &str {
        "word"
    }

    fn supported_types(&self) -> &[&str] {
        SUPPORTED_TYPES
    }

    fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
        self.ensure_accepts(blob)?;
        Ok(Box::new(std::iter::once_with(move || self.to_unit(blob))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docunits_core::Error;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", FileOptions::default())
            .unwrap();
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        write!(
            zip,
            "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
            body
        )
        .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_convert_docx() {
        let blob = SourceBlob::new(docx(&["Title", "First line"]), mime::DOCX).with_source("memo.docx");
        let units = WordConverter::new().convert(&blob).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "Title\nFirst line");
        assert_eq!(units[0].metadata["paragraphs"], 2);
        assert_eq!(units[0].metadata["source"], "memo.docx");
        assert_eq!(units[0].metadata["format"], "docx");
    }

    fn cfb_without_word_stream() -> Vec<u8> {
        let mut cfb = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        {
            let mut s = cfb.create_stream("/Contents").unwrap();
            s.write_all(&[0u8; 16]).unwrap();
        }
        cfb.flush().unwrap();
        cfb.into_inner().into_inner()
    }

    #[test]
    fn test_detect_format() {
        let zip = SourceBlob::new(docx(&["x"]), mime::MSWORD);
        assert_eq!(WordFormat::detect(&zip), WordFormat::Docx);

        let ole = SourceBlob::new(cfb_without_word_stream(), mime::DOCX);
        assert_eq!(WordFormat::detect(&ole), WordFormat::Doc);

        let unknown = SourceBlob::new(b"????".to_vec(), mime::MSWORD);
        assert_eq!(WordFormat::detect(&unknown), WordFormat::Doc);
        let unknown = SourceBlob::new(b"????".to_vec(), mime::DOCX);
        assert_eq!(WordFormat::detect(&unknown), WordFormat::Docx);
    }

    #[test]
    fn test_docx_bytes_declared_as_msword() {
        let blob = SourceBlob::new(docx(&["x"]), mime::MSWORD);
        let units = WordConverter::new().convert(&blob).unwrap();
        assert_eq!(units[0].text, "x");
        assert_eq!(units[0].metadata["format"], "docx");
    }

    #[test]
    fn test_legacy_word_goes_to_binary_backend() {
        let blob = SourceBlob::new(cfb_without_word_stream(), mime::MSWORD);
        assert!(matches!(
            WordConverter::new().convert(&blob),
            Err(Error::DocParseError(_))
        ));
    }

    #[test]
    fn test_other_types_are_unsupported() {
        let blob = SourceBlob::new(docx(&["x"]), "application/rtf");
        assert!(WordConverter::new().convert(&blob).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_missing_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/styles.xml", FileOptions::default())
            .unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let blob = SourceBlob::new(bytes, mime::DOCX);
        assert!(matches!(
            WordConverter::new().convert(&blob),
            Err(Error::ZipError(_))
        ));
    }
}
