//! DOCX paragraph extraction.

use docunits_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

const DOCUMENT_PATH: &str = "word/document.xml";

/// Read the main document part and return its non-empty paragraphs.
pub fn read_paragraphs<R: Read + Seek>(reader: R) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

    let mut document = archive
        .by_name(DOCUMENT_PATH)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", DOCUMENT_PATH, e)))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", DOCUMENT_PATH, e)))?;

    paragraphs_from_xml(&xml)
}

/// Collect paragraph text from `word/document.xml`.
///
/// Runs inside a paragraph are concatenated; a `w:tab` run element becomes a
/// tab and `w:br`/`w:cr` a newline. Blank paragraphs are dropped. Paragraphs
/// nested in text boxes are emitted on their own, before the paragraph
/// that anchors them.
pub fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => open.push(String::new()),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"tab" if run_depth > 0 => push(&mut open, "\t"),
                b"br" | b"cr" if run_depth > 0 => push(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text run: {}", err)))?;
                push(&mut open, &text);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    if let Some(text) = open.pop() {
                        let text = text.trim();
                        if !text.is_empty() {
                            paragraphs.push(text.to_string());
                        }
                    }
                }
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Append to the innermost open paragraph; text outside any paragraph is ignored.
fn push(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
