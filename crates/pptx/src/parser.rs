//! PPTX file parser implementation.

use docunits_core::{Error, ExtractedSlide, Presentation, PresentationFormat, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut presentation = Presentation::new(filename, PresentationFormat::Pptx);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("PPTX '{}' lists {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// The `sldIdLst` of presentation.xml is authoritative; the numeric order of
    /// the slide relationships is used when it is missing.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let relationships = parse_slide_relationships(&rels_content)?;

        let listed = if archive.file_names().any(|name| name == PRESENTATION_PATH) {
            let content = self.read_file_from_archive(archive, PRESENTATION_PATH)?;
            parse_slide_id_list(&content)?
        } else {
            Vec::new()
        };

        if !listed.is_empty() {
            let by_id: HashMap<&str, &str> = relationships
                .iter()
                .map(|r| (r.id.as_str(), r.target.as_str()))
                .collect();
            return listed
                .iter()
                .map(|rid| {
                    by_id
                        .get(rid.as_str())
                        .map(|target| resolve_target(target))
                        .ok_or_else(|| {
                            Error::PptxParseError(format!(
                                "Slide relationship '{}' not found in {}",
                                rid, PRESENTATION_RELS_PATH
                            ))
                        })
                })
                .collect();
        }

        let mut slides: Vec<(String, Option<usize>)> = relationships
            .iter()
            .map(|r| {
                let order = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
                (resolve_target(&r.target), order)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<ExtractedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut slide = ExtractedSlide::new(slide_number);

        for shape in extract_shapes_from_xml(&content)? {
            if shape.is_title {
                slide.add_title(shape.text);
            } else {
                slide.add_shape(shape.text);
            }
        }

        Ok(slide)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A slide relationship from presentation.xml.rels.
#[derive(Debug)]
struct SlideRelationship {
    id: String,
    target: String,
}

/// Collect the slide relationships, skipping layouts, masters, and other parts.
fn parse_slide_relationships(xml: &str) -> Result<Vec<SlideRelationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let rel_type = attribute(e, b"Type").unwrap_or_default();
                if rel_type.ends_with("/slide") {
                    relationships.push(SlideRelationship {
                        id: attribute(e, b"Id").unwrap_or_default(),
                        target: attribute(e, b"Target").unwrap_or_default(),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                let rid = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    (key != b"id" && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                if let Some(rid) = rid {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Information about a text shape extracted from slide XML.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    is_title: bool,
    paragraphs: usize,
}

/// Extract text shapes, in document order, from slide XML.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<ShapeInfo>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(false);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current_shape = Some(ShapeInfo::default());
                }
                b"ph" => mark_title(&mut current_shape, e),
                b"txBody" => {
                    in_text_body = true;
                }
                b"p" if in_text_body => start_paragraph(&mut current_shape),
                b"t" if in_text_body => {
                    in_run_text = true;
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"ph" => mark_title(&mut current_shape, e),
                b"p" if in_text_body => start_paragraph(&mut current_shape),
                b"br" if in_text_body => {
                    if let Some(ref mut shape) = current_shape {
                        shape.text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_run_text {
                    if let Some(ref mut shape) = current_shape {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::XmlError(format!("Bad text run: {}", err)))?;
                        shape.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current_shape.take() {
                        shape.text = shape.text.trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    in_text_body = false;
                    in_run_text = false;
                }
                b"txBody" => {
                    in_text_body = false;
                }
                b"t" => {
                    in_run_text = false;
                }
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

    Ok(shapes)
}

fn start_paragraph(shape: &mut Option<ShapeInfo>) {
    if let Some(ref mut shape) = shape {
        if shape.paragraphs > 0 {
            shape.text.push('\n');
        }
        shape.paragraphs += 1;
    }
}

/// Flag the current shape when its placeholder is a title.
fn mark_title(shape: &mut Option<ShapeInfo>, e: &BytesStart) {
    if let Some(ref mut shape) = shape {
        if matches!(attribute(e, b"type").as_deref(), Some("title" | "ctrTitle")) {
            shape.is_title = true;
        }
    }
}

fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Turn a relationship target into an archive path.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
