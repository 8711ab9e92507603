//! PPT file parser implementation.
//!
//! Parses legacy PowerPoint files using the OLE/CFB container format. Nested
//! record containers are walked recursively, text atoms are grouped into
//! slides, and the preceding `TextHeaderAtom` decides whether a text block is
//! a title placeholder.

use cfb::CompoundFile;
use docunits_core::{Error, ExtractedSlide, Presentation, PresentationFormat, Result};
use encoding_rs::WINDOWS_1252;
use std::collections::HashSet;
use std::io::{Read, Seek};

/// Minimum stream size for a valid PPT file (bytes).
const MIN_STREAM_SIZE: usize = 512;

/// Maximum supported text type value.
const MAX_SUPPORTED_TEXT_TYPE: u32 = 8;

/// Malformed records tolerated before the stream is declared corrupt.
const MAX_MALFORMED_RECORDS: usize = 10;

const DOCUMENT_STREAM: &str = "/PowerPoint Document";

/// `SlideListWithText` instances holding master and notes persist entries.
const MASTER_LIST_INSTANCE: u16 = 1;
const NOTES_LIST_INSTANCE: u16 = 2;

/// Record type constants for PPT file format.
mod record_types {
    pub const RT_DOCUMENT: u16 = 0x1388;
    pub const RT_SLIDE: u16 = 0x03E8;
    pub const RT_SLIDE_PERSIST_ATOM: u16 = 0x03F0;
    pub const RT_SLIDE_LIST_WITH_TEXT: u16 = 0x0FF0;
    pub const RT_TEXT_HEADER_ATOM: u16 = 0x0F9F;
    pub const RT_TEXT_CHARS_ATOM: u16 = 0x0FA0;
    pub const RT_TEXT_BYTES_ATOM: u16 = 0x0FA8;
}

/// Placeholder text PowerPoint stores in masters and layouts.
const TEMPLATE_PATTERNS: &[&str] = &[
    "click to edit",
    "edit master",
    "master title",
    "master text",
    "second level",
    "third level",
    "fourth level",
    "fifth level",
];

/// Information collected during stream validation.
#[derive(Debug, Default)]
struct FileValidation {
    stream_size: usize,
    has_document: bool,
    has_slides: bool,
    has_text_content: bool,
    text_record_count: usize,
    unsupported_text_types: HashSet<u32>,
    malformed_records: usize,
}

/// Text types from RT_TextHeaderAtom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextType {
    Title = 0,
    Body = 1,
    Notes = 2,
    NotUsed = 3,
    Other = 4,
    CenterBody = 5,
    CenterTitle = 6,
    HalfBody = 7,
    QuarterBody = 8,
}

impl TextType {
    fn from_u32(value: u32) -> Self {
        match value {
            0 => TextType::Title,
            1 => TextType::Body,
            2 => TextType::Notes,
            3 => TextType::NotUsed,
            5 => TextType::CenterBody,
            6 => TextType::CenterTitle,
            7 => TextType::HalfBody,
            8 => TextType::QuarterBody,
            _ => TextType::Other,
        }
    }

    /// Whether text of this type is visible on the slide (not notes or unused).
    fn is_slide_content(&self) -> bool {
        !matches!(self, TextType::Notes | TextType::NotUsed)
    }

    fn is_title(&self) -> bool {
        matches!(self, TextType::Title | TextType::CenterTitle)
    }
}

/// Parser for legacy PPT (OLE/CFB) files.
pub struct PptParser;

impl PptParser {
    /// Create a new PPT parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPT file from a reader.
    ///
    /// The document stream is validated before extraction so that truncated or
    /// foreign containers fail instead of producing garbage text.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| Error::CfbError(format!("Failed to open CFB container: {}", e)))?;

        self.validate_cfb_structure(&cfb)?;

        let stream_data = self.read_powerpoint_stream(&mut cfb)?;
        let validation = self.validate_stream(&stream_data)?;

        log::debug!(
            "PPT validation: stream_size={}, has_document={}, has_slides={}, \
             has_text_content={}, text_records={}, malformed={}",
            validation.stream_size,
            validation.has_document,
            validation.has_slides,
            validation.has_text_content,
            validation.text_record_count,
            validation.malformed_records
        );

        let mut presentation = Presentation::new(filename, PresentationFormat::Ppt);
        for slide in self.extract_text_from_stream(&stream_data) {
            presentation.add_slide(slide);
        }

        if presentation.slides.is_empty() {
            log::warn!(
                "No slide text extracted from '{}'; it may contain only images or \
                 use an unsupported text storage format.",
                filename
            );
        }

        Ok(presentation)
    }

    /// Validate the CFB container has the PowerPoint document stream.
    fn validate_cfb_structure<R: Read + Seek>(&self, cfb: &CompoundFile<R>) -> Result<()> {
        let has_ppt_doc = cfb
            .walk()
            .any(|entry| entry.path().to_string_lossy() == DOCUMENT_STREAM);

        if !has_ppt_doc {
            return Err(Error::PptParseError(
                "Missing 'PowerPoint Document' stream. This may not be a valid PPT file \
                 or may be a different Office format."
                    .to_string(),
            ));
        }

        let has_current_user = cfb
            .walk()
            .any(|entry| entry.path().to_string_lossy() == "/Current User");

        if !has_current_user {
            log::warn!("Missing 'Current User' stream. File may be an older PPT format variant.");
        }

        Ok(())
    }

    /// Validate the PowerPoint Document stream content.
    fn validate_stream(&self, data: &[u8]) -> Result<FileValidation> {
        let mut validation = FileValidation {
            stream_size: data.len(),
            ..Default::default()
        };

        if data.len() < MIN_STREAM_SIZE {
            return Err(Error::CorruptedFile(format!(
                "PowerPoint Document stream too small ({} bytes). \
                 Minimum expected: {} bytes. File may be corrupted or truncated.",
                data.len(),
                MIN_STREAM_SIZE
            )));
        }

        self.scan_records_for_validation(data, 0, data.len(), &mut validation);

        if !validation.has_document {
            return Err(Error::PptParseError(
                "No RT_Document record found. This file may use a pre-97 PowerPoint \
                 format or be corrupted."
                    .to_string(),
            ));
        }

        if !validation.unsupported_text_types.is_empty() {
            log::warn!(
                "File contains unsupported text types: {:?}. Some text may not be extracted.",
                validation.unsupported_text_types
            );
        }

        if validation.malformed_records > MAX_MALFORMED_RECORDS {
            return Err(Error::CorruptedFile(format!(
                "Too many malformed records ({}) detected. File may be corrupted.",
                validation.malformed_records
            )));
        }

        Ok(validation)
    }

    /// Scan records to collect validation information.
    fn scan_records_for_validation(
        &self,
        data: &[u8],
        start: usize,
        end: usize,
        validation: &mut FileValidation,
    ) {
        for record in Records::new(data, start, end) {
            let Some(record) = record else {
                validation.malformed_records += 1;
                break;
            };

            match record.rec_type {
                record_types::RT_DOCUMENT => validation.has_document = true,
                record_types::RT_SLIDE => validation.has_slides = true,
                record_types::RT_TEXT_HEADER_ATOM => {
                    if let Some(text_type) = record.leading_u32(data) {
                        if text_type > MAX_SUPPORTED_TEXT_TYPE {
                            validation.unsupported_text_types.insert(text_type);
                        }
                    }
                }
                record_types::RT_TEXT_CHARS_ATOM | record_types::RT_TEXT_BYTES_ATOM => {
                    validation.has_text_content = true;
                    validation.text_record_count += 1;
                }
                _ => {}
            }

            if record.is_container() {
                self.scan_records_for_validation(data, record.content_start, record.content_end, validation);
            }
        }
    }

    /// Read the PowerPoint Document stream from the CFB container.
    fn read_powerpoint_stream<R: Read + Seek>(&self, cfb: &mut CompoundFile<R>) -> Result<Vec<u8>> {
        let mut stream = cfb.open_stream(DOCUMENT_STREAM).map_err(|e| {
            Error::CfbError(format!("Failed to open PowerPoint Document stream: {}", e))
        })?;

        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|e| Error::CfbError(format!("Failed to read stream: {}", e)))?;

        Ok(data)
    }

    /// Extract slides from the PowerPoint Document stream.
    fn extract_text_from_stream(&self, data: &[u8]) -> Vec<ExtractedSlide> {
        let mut entries = Vec::new();
        let mut state = WalkState {
            text_type: TextType::Body,
            slide_persist_count: 0,
            in_other_list: false,
        };
        self.collect_text_entries(data, 0, data.len(), &mut entries, &mut state);

        self.organize_into_slides(entries, state.slide_persist_count)
    }

    /// Recursively walk records, collecting visible text atoms.
    fn collect_text_entries(
        &self,
        data: &[u8],
        start: usize,
        end: usize,
        entries: &mut Vec<TextEntry>,
        state: &mut WalkState,
    ) {
        for record in Records::new(data, start, end) {
            let Some(record) = record else {
                break;
            };

            if record.rec_type == record_types::RT_SLIDE_LIST_WITH_TEXT {
                let outer = state.in_other_list;
                state.in_other_list = matches!(
                    record.rec_instance,
                    MASTER_LIST_INSTANCE | NOTES_LIST_INSTANCE
                );
                self.collect_text_entries(data, record.content_start, record.content_end, entries, state);
                state.in_other_list = outer;
                continue;
            }
            if state.in_other_list {
                continue;
            }

            let text = match record.rec_type {
                record_types::RT_SLIDE_PERSIST_ATOM => {
                    state.slide_persist_count += 1;
                    None
                }
                record_types::RT_TEXT_HEADER_ATOM => {
                    if let Some(value) = record.leading_u32(data) {
                        state.text_type = TextType::from_u32(value);
                    }
                    None
                }
                record_types::RT_TEXT_CHARS_ATOM => {
                    extract_unicode_text(data, record.content_start, record.len())
                }
                record_types::RT_TEXT_BYTES_ATOM => {
                    extract_ansi_text(data, record.content_start, record.len())
                }
                _ => None,
            };

            if let Some(text) = text {
                if is_valid_slide_text(&text, state.text_type) {
                    entries.push(TextEntry {
                        text,
                        text_type: state.text_type,
                        position: record.offset,
                        slide_hint: state.slide_persist_count,
                    });
                }
            }

            if record.is_container() {
                self.collect_text_entries(data, record.content_start, record.content_end, entries, state);
            }
        }
    }

    /// Group text entries into numbered slides.
    ///
    /// With persist atoms present there is exactly one slide per atom, text or
    /// not; text seen before the first atom goes to slide 1. Without them,
    /// title atoms mark where each slide begins.
    fn organize_into_slides(&self, entries: Vec<TextEntry>, slide_count: usize) -> Vec<ExtractedSlide> {
        let mut groups: Vec<Vec<&TextEntry>> = if slide_count > 0 {
            let mut groups = vec![Vec::new(); slide_count];
            for entry in &entries {
                let index = entry.slide_hint.clamp(1, slide_count) - 1;
                groups[index].push(entry);
            }
            groups
        } else {
            split_by_titles(&entries)
        };

        let mut slides = Vec::with_capacity(groups.len());
        for group in groups.iter_mut() {
            group.sort_by_key(|e| e.position);

            let mut slide = ExtractedSlide::new(slides.len() + 1);
            for entry in group.iter() {
                if entry.text_type.is_title() {
                    slide.add_title(entry.text.trim());
                } else {
                    slide.add_shape(entry.text.trim());
                }
            }
            slides.push(slide);
        }

        slides
    }
}

impl Default for PptParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state threaded through the recursive record walk.
struct WalkState {
    text_type: TextType,
    slide_persist_count: usize,
    /// Inside a master or notes `SlideListWithText`.
    in_other_list: bool,
}

/// Text with the record metadata needed to place it on a slide.
#[derive(Debug)]
struct TextEntry {
    text: String,
    text_type: TextType,
    position: usize,
    slide_hint: usize,
}

/// An 8-byte record header plus the bounds of its payload.
#[derive(Debug, Clone, Copy)]
struct RecordHeader {
    offset: usize,
    rec_ver: u16,
    rec_instance: u16,
    rec_type: u16,
    content_start: usize,
    content_end: usize,
}

impl RecordHeader {
    fn is_container(&self) -> bool {
        self.rec_ver == 0x0F
    }

    fn len(&self) -> usize {
        self.content_end - self.content_start
    }

    fn leading_u32(&self, data: &[u8]) -> Option<u32> {
        (self.len() >= 4).then(|| read_u32_le(data, self.content_start))
    }
}

/// Iterator over sibling records in `data[start..end]`.
///
/// Yields `None` once for a record whose payload overruns its parent, then stops.
struct Records<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
    done: bool,
}

impl<'a> Records<'a> {
    fn new(data: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            data,
            pos: start,
            end: end.min(data.len()),
            done: false,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Option<RecordHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos + 8 > self.end {
            return None;
        }

        // recVer (4 bits) + recInstance (12 bits), recType, recLen
        let rec_ver_instance = read_u16_le(self.data, self.pos);
        let rec_type = read_u16_le(self.data, self.pos + 2);
        let rec_len = read_u32_le(self.data, self.pos + 4) as usize;

        let content_start = self.pos + 8;
        let content_end = content_start.saturating_add(rec_len);
        if content_end > self.end {
            self.done = true;
            return Some(None);
        }

        let header = RecordHeader {
            offset: self.pos,
            rec_ver: rec_ver_instance & 0x0F,
            rec_instance: rec_ver_instance >> 4,
            rec_type,
            content_start,
            content_end,
        };
        self.pos = content_end;
        Some(Some(header))
    }
}

/// Check if text is visible slide content rather than template or junk.
fn is_valid_slide_text(text: &str, text_type: TextType) -> bool {
    let trimmed = text.trim();

    if trimmed.is_empty() || !text_type.is_slide_content() {
        return false;
    }

    let lowered = trimmed.to_lowercase();
    if TEMPLATE_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return false;
    }

    // Lone bullets and similar single-glyph placeholders.
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_alphanumeric();
    }

    true
}

/// Start a new group at every title entry.
fn split_by_titles(entries: &[TextEntry]) -> Vec<Vec<&TextEntry>> {
    let mut groups = Vec::new();
    let mut current: Vec<&TextEntry> = Vec::new();

    for entry in entries {
        if entry.text_type.is_title() && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(entry);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Decode a UTF-16LE text atom, stopping at a NUL terminator.
fn extract_unicode_text(data: &[u8], start: usize, len: usize) -> Option<String> {
    if len == 0 || start + len > data.len() || len % 2 != 0 {
        return None;
    }

    let units = data[start..start + len]
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]));

    let text: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .take_while(|&c| c != '\0')
        .map(normalize_line_break)
        .collect();

    (!text.is_empty()).then_some(text)
}

/// Decode an 8-bit text atom as Windows-1252, stopping at a NUL terminator.
fn extract_ansi_text(data: &[u8], start: usize, len: usize) -> Option<String> {
    if len == 0 || start + len > data.len() {
        return None;
    }

    let slice = &data[start..start + len];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());

    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&slice[..end]);
    let text: String = decoded.chars().map(normalize_line_break).collect();

    (!text.trim().is_empty()).then_some(text)
}

/// PowerPoint separates paragraphs with CR and soft breaks with VT.
fn normalize_line_break(c: char) -> char {
    match c {
        '\r' | '\u{0B}' => '\n',
        c => c,
    }
}

/// Read a little-endian u16 from a byte slice.
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read a little-endian u32 from a byte slice.
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn record(ver: u16, rec_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + payload.len());
        out.extend_from_slice(&ver.to_le_bytes());
        out.extend_from_slice(&rec_type.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn container(rec_type: u16, children: &[Vec<u8>]) -> Vec<u8> {
        record(0x0F, rec_type, &children.concat())
    }

    fn text_block(text_type: u32, text: &str) -> Vec<u8> {
        let mut out = record(0, record_types::RT_TEXT_HEADER_ATOM, &text_type.to_le_bytes());
        out.extend(record(0, record_types::RT_TEXT_BYTES_ATOM, text.as_bytes()));
        out
    }

    fn persist() -> Vec<u8> {
        record(0, record_types::RT_SLIDE_PERSIST_ATOM, &[0u8; 20])
    }

    /// A document stream: one RT_Document container padded past the minimum size.
    fn document_stream(children: &[Vec<u8>]) -> Vec<u8> {
        let mut data = container(record_types::RT_DOCUMENT, children);
        data.resize(data.len().max(MIN_STREAM_SIZE + 16), 0);
        data
    }

    fn build_ppt(stream: &[u8]) -> Vec<u8> {
        let mut cfb = CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        {
            let mut s = cfb.create_stream(DOCUMENT_STREAM).unwrap();
            s.write_all(stream).unwrap();
        }
        {
            let mut s = cfb.create_stream("/Current User").unwrap();
            s.write_all(&[0u8; 16]).unwrap();
        }
        cfb.flush().unwrap();
        cfb.into_inner().into_inner()
    }

    #[test]
    fn test_read_u16_le() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(read_u16_le(&data, 0), 0x0201);
        assert_eq!(read_u16_le(&data, 2), 0x0403);
    }

    #[test]
    fn test_read_u32_le() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(read_u32_le(&data, 0), 0x04030201);
    }

    #[test]
    fn test_extract_ansi_text() {
        let data = b"Hello World\0garbage";
        assert_eq!(
            extract_ansi_text(data, 0, data.len()),
            Some("Hello World".to_string())
        );
    }

    #[test]
    fn test_extract_ansi_text_maps_cp1252_and_breaks() {
        let data = [b'a', 0x92, b's', b'\r', b'b'];
        assert_eq!(
            extract_ansi_text(&data, 0, data.len()),
            Some("a\u{2019}s\nb".to_string())
        );
    }

    #[test]
    fn test_extract_unicode_text() {
        // "Hi" in UTF-16LE
        let data = [0x48, 0x00, 0x69, 0x00];
        assert_eq!(extract_unicode_text(&data, 0, 4), Some("Hi".to_string()));
        assert_eq!(extract_unicode_text(&data, 0, 3), None);
    }

    #[test]
    fn test_extract_unicode_text_replaces_lone_surrogate() {
        // "a", lone high surrogate, "b", NUL, "c"
        let data = [0x61, 0x00, 0x00, 0xD8, 0x62, 0x00, 0x00, 0x00, 0x63, 0x00];
        assert_eq!(
            extract_unicode_text(&data, 0, data.len()),
            Some("a\u{FFFD}b".to_string())
        );
    }

    #[test]
    fn test_text_type_conversion() {
        assert_eq!(TextType::from_u32(0), TextType::Title);
        assert_eq!(TextType::from_u32(6), TextType::CenterTitle);
        assert_eq!(TextType::from_u32(2), TextType::Notes);
        assert_eq!(TextType::from_u32(99), TextType::Other);

        assert!(TextType::Title.is_title());
        assert!(TextType::CenterTitle.is_title());
        assert!(!TextType::Body.is_title());
        assert!(TextType::Other.is_slide_content());
        assert!(!TextType::Notes.is_slide_content());
        assert!(!TextType::NotUsed.is_slide_content());
    }

    #[test]
    fn test_template_filtering() {
        assert!(!is_valid_slide_text("Click to edit Master title style", TextType::Title));
        assert!(!is_valid_slide_text("Edit Master text styles", TextType::Body));
        assert!(is_valid_slide_text("Quarterly results", TextType::Title));
        assert!(!is_valid_slide_text("Speaker notes", TextType::Notes));
        assert!(!is_valid_slide_text("*", TextType::Body));
        assert!(is_valid_slide_text("A", TextType::Body));
    }

    #[test]
    fn test_records_flag_overrun() {
        let mut data = record(0, 0x0001, b"abcd");
        data.extend_from_slice(&[0, 0, 0x01, 0x00, 0xFF, 0x00, 0x00, 0x00]);

        let records: Vec<_> = Records::new(&data, 0, data.len()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_some());
        assert!(records[1].is_none());
    }

    #[test]
    fn test_validate_stream_too_small() {
        let result = PptParser::new().validate_stream(&[0u8; 100]);
        assert!(matches!(result, Err(Error::CorruptedFile(_))));
    }

    #[test]
    fn test_validate_stream_no_document() {
        let mut data = record(0, 0x0001, &[0u8; 8]);
        data.resize(1024, 0);

        let result = PptParser::new().validate_stream(&data);
        assert!(matches!(result, Err(Error::PptParseError(_))));
    }

    #[test]
    fn test_validate_detects_unsupported_text_type() {
        let data = document_stream(&[text_block(99, "Test")]);

        let validation = PptParser::new().validate_stream(&data).unwrap();
        assert!(validation.has_document);
        assert!(validation.has_text_content);
        assert_eq!(validation.text_record_count, 1);
        assert!(validation.unsupported_text_types.contains(&99));
    }

    #[test]
    fn test_slides_split_on_persist_atoms() {
        let data = document_stream(&[
            persist(),
            text_block(0, "Intro"),
            text_block(1, "Hello"),
            persist(),
            text_block(1, "World"),
        ]);

        let slides = PptParser::new().extract_text_from_stream(&data);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title(), "Intro");
        assert_eq!(slides[0].content(), "Hello");
        assert_eq!(slides[1].title(), "");
        assert_eq!(slides[1].content(), "World");
    }

    #[test]
    fn test_slides_without_text_keep_their_numbers() {
        let data = document_stream(&[
            persist(),
            text_block(1, "A"),
            persist(),
            persist(),
            text_block(1, "C"),
        ]);

        let slides = PptParser::new().extract_text_from_stream(&data);
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].content(), "A");
        assert!(slides[1].shapes.is_empty());
        assert_eq!(slides[2].number, 3);
        assert_eq!(slides[2].content(), "C");
    }

    #[test]
    fn test_master_and_notes_lists_are_not_slides() {
        let master = record(
            0x0F | (MASTER_LIST_INSTANCE << 4),
            record_types::RT_SLIDE_LIST_WITH_TEXT,
            &[persist(), text_block(0, "Master title")].concat(),
        );
        let slides_list = container(
            record_types::RT_SLIDE_LIST_WITH_TEXT,
            &[persist(), text_block(0, "Real"), persist()],
        );
        let notes = record(
            0x0F | (NOTES_LIST_INSTANCE << 4),
            record_types::RT_SLIDE_LIST_WITH_TEXT,
            &[persist(), text_block(1, "Note body")].concat(),
        );
        let data = document_stream(&[master, slides_list, notes]);

        let slides = PptParser::new().extract_text_from_stream(&data);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title(), "Real");
        assert!(slides[1].shapes.is_empty());
    }

    #[test]
    fn test_slides_split_on_titles_without_persist_atoms() {
        let data = document_stream(&[
            text_block(0, "One"),
            text_block(1, "first body"),
            text_block(6, "Two"),
            text_block(1, "second body"),
        ]);

        let slides = PptParser::new().extract_text_from_stream(&data);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[1].number, 2);
        assert_eq!(slides[1].title(), "Two");
        assert_eq!(slides[1].content(), "second body");
    }

    #[test]
    fn test_notes_are_dropped() {
        let data = document_stream(&[text_block(1, "Visible"), text_block(2, "Private notes")]);

        let slides = PptParser::new().extract_text_from_stream(&data);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].content(), "Visible");
    }

    #[test]
    fn test_parse_cfb_container() {
        let stream = document_stream(&[
            container(record_types::RT_SLIDE, &[persist(), text_block(0, "Intro"), text_block(1, "Hello")]),
        ]);
        let bytes = build_ppt(&stream);

        let presentation = PptParser::new()
            .parse(Cursor::new(bytes), "deck.ppt")
            .unwrap();
        assert_eq!(presentation.format, PresentationFormat::Ppt);
        assert_eq!(presentation.slides.len(), 1);
        assert_eq!(presentation.slides[0].title(), "Intro");
        assert_eq!(presentation.full_text(), "Hello");
    }

    #[test]
    fn test_parse_rejects_non_cfb() {
        let result = PptParser::new().parse(Cursor::new(vec![0u8; 64]), "bad.ppt");
        assert!(matches!(result, Err(Error::CfbError(_))));
    }
}
