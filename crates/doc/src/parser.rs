//! Word 97-2003 binary document parser.
//!
//! The main text lives in the `WordDocument` stream as a list of pieces.
//! The piece table is stored in the `Clx` structure of the table stream
//! (`0Table` or `1Table`, chosen by a FIB flag). Each piece is either
//! 8-bit Windows-1252 or UTF-16LE.

use cfb::CompoundFile;
use docunits_core::{Error, Result};
use encoding_rs::WINDOWS_1252;
use std::io::{Read, Seek};

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";

/// `wIdent` of a Word 97+ File Information Block.
const FIB_IDENT: u16 = 0xA5EC;

/// FibBase flag bits (offset 0x0A).
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

/// Offsets inside FibBase and the variable FIB tail.
mod fib_offsets {
    pub const IDENT: usize = 0x00;
    pub const FLAGS: usize = 0x0A;
    /// `csw`, the count of 16-bit values in `fibRgW`.
    pub const CSW: usize = 0x20;
    /// Index of `ccpText` in `fibRgLw`.
    pub const CCP_TEXT_INDEX: usize = 3;
    /// Index of the `fcClx`/`lcbClx` pair in `fibRgFcLcb`.
    pub const CLX_PAIR_INDEX: usize = 33;
}

/// `Clx` entry tags.
const CLXT_PRC: u8 = 0x01;
const CLXT_PCDT: u8 = 0x02;

/// Set in a piece's `fc` when its text is 8-bit.
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// Field markers in the character stream.
const FIELD_BEGIN: char = '\u{13}';
const FIELD_SEPARATOR: char = '\u{14}';
const FIELD_END: char = '\u{15}';

/// Values read from the File Information Block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fib {
    table_stream: &'static str,
    ccp_text: u32,
    fc_clx: u32,
    lcb_clx: u32,
}

impl Fib {
    fn parse(data: &[u8]) -> Result<Self> {
        if read_u16(data, fib_offsets::IDENT)? != FIB_IDENT {
            return Err(Error::DocParseError(
                "WordDocument stream does not start with a Word 97+ FIB".to_string(),
            ));
        }

        let flags = read_u16(data, fib_offsets::FLAGS)?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(Error::DocParseError(
                "Encrypted documents are not supported".to_string(),
            ));
        }
        let table_stream = if flags & FLAG_WHICH_TABLE != 0 {
            "/1Table"
        } else {
            "/0Table"
        };

        // fibRgW, fibRgLw and fibRgFcLcb each follow a 16-bit count.
        let csw = read_u16(data, fib_offsets::CSW)? as usize;
        let cslw_at = fib_offsets::CSW + 2 + csw * 2;
        let cslw = read_u16(data, cslw_at)? as usize;
        let rg_lw = cslw_at + 2;
        if cslw <= fib_offsets::CCP_TEXT_INDEX {
            return Err(Error::DocParseError("FIB has no text length".to_string()));
        }
        let ccp_text = read_u32(data, rg_lw + fib_offsets::CCP_TEXT_INDEX * 4)?;

        let cb_rg_fc_lcb_at = rg_lw + cslw * 4;
        let cb_rg_fc_lcb = read_u16(data, cb_rg_fc_lcb_at)? as usize;
        if cb_rg_fc_lcb <= fib_offsets::CLX_PAIR_INDEX {
            return Err(Error::DocParseError("FIB has no piece table entry".to_string()));
        }
        let clx_at = cb_rg_fc_lcb_at + 2 + fib_offsets::CLX_PAIR_INDEX * 8;

        Ok(Self {
            table_stream,
            ccp_text,
            fc_clx: read_u32(data, clx_at)?,
            lcb_clx: read_u32(data, clx_at + 4)?,
        })
    }
}

/// One run of text: character positions `[cp_start, cp_end)` stored at `fc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    fc: u32,
    compressed: bool,
}

impl Piece {
    fn char_count(&self) -> usize {
        self.cp_end.saturating_sub(self.cp_start) as usize
    }
}

/// Parser for legacy Word (OLE/CFB) files.
pub struct DocParser;

impl DocParser {
    /// Create a new DOC parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOC file and return its non-empty paragraphs in order.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<String>> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| Error::CfbError(format!("Failed to open CFB container: {}", e)))?;

        if !cfb.is_stream(WORD_DOCUMENT_STREAM) {
            return Err(Error::DocParseError(
                "Missing WordDocument stream - not a Word document".to_string(),
            ));
        }

        let word = read_stream(&mut cfb, WORD_DOCUMENT_STREAM)?;
        let fib = Fib::parse(&word)?;
        log::debug!(
            "DOC FIB: table={}, ccp_text={}, fc_clx={}, lcb_clx={}",
            fib.table_stream,
            fib.ccp_text,
            fib.fc_clx,
            fib.lcb_clx
        );

        if fib.lcb_clx == 0 {
            return Err(Error::DocParseError("Document has no piece table".to_string()));
        }
        if !cfb.is_stream(fib.table_stream) {
            return Err(Error::DocParseError(format!(
                "Missing table stream '{}'",
                fib.table_stream
            )));
        }
        let table = read_stream(&mut cfb, fib.table_stream)?;

        let clx = slice(&table, fib.fc_clx as usize, fib.lcb_clx as usize)
            .ok_or_else(|| Error::DocParseError("Clx lies outside the table stream".to_string()))?;
        let pieces = parse_clx(clx)?;
        let text = main_text(&word, &pieces, fib.ccp_text)?;

        let paragraphs = paragraphs_from_text(&text);
        log::debug!("DOC pieces={}, paragraphs={}", pieces.len(), paragraphs.len());
        Ok(paragraphs)
    }
}

impl Default for DocParser {
    fn default() -> Self {
        Self::new()
    }
}

fn read_stream<R: Read + Seek>(cfb: &mut CompoundFile<R>, name: &str) -> Result<Vec<u8>> {
    let mut stream = cfb
        .open_stream(name)
        .map_err(|e| Error::CfbError(format!("Failed to open stream '{}': {}", name, e)))?;

    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|e| Error::CfbError(format!("Failed to read stream '{}': {}", name, e)))?;
    Ok(data)
}

/// Walk the `Clx`: skip property runs (`Prc`), then decode the piece table.
fn parse_clx(clx: &[u8]) -> Result<Vec<Piece>> {
    let mut pos = 0;
    while pos < clx.len() {
        match clx[pos] {
            CLXT_PRC => {
                let cb = read_u16(clx, pos + 1)? as i16;
                if cb < 0 {
                    return Err(Error::DocParseError(format!("Negative Prc size at {}", pos)));
                }
                pos += 3 + cb as usize;
            }
            CLXT_PCDT => {
                let lcb = read_u32(clx, pos + 1)? as usize;
                let plc = slice(clx, pos + 5, lcb)
                    .ok_or_else(|| Error::DocParseError("Truncated piece table".to_string()))?;
                return parse_plc_pcd(plc);
            }
            other => {
                return Err(Error::DocParseError(format!(
                    "Unexpected Clx entry 0x{:02X} at {}",
                    other, pos
                )));
            }
        }
    }
    Err(Error::DocParseError("Clx has no piece table".to_string()))
}

/// `PlcPcd`: n+1 character positions followed by n 8-byte piece descriptors.
fn parse_plc_pcd(plc: &[u8]) -> Result<Vec<Piece>> {
    if plc.len() < 4 || (plc.len() - 4) % 12 != 0 {
        return Err(Error::DocParseError(format!(
            "Piece table has invalid size {}",
            plc.len()
        )));
    }
    let count = (plc.len() - 4) / 12;
    let descriptors = (count + 1) * 4;

    let mut pieces = Vec::with_capacity(count);
    for i in 0..count {
        let fc_raw = read_u32(plc, descriptors + i * 8 + 2)?;
        let compressed = fc_raw & FC_COMPRESSED != 0;
        pieces.push(Piece {
            cp_start: read_u32(plc, i * 4)?,
            cp_end: read_u32(plc, (i + 1) * 4)?,
            fc: fc_raw & FC_MASK,
            compressed,
        });
    }
    Ok(pieces)
}

/// Concatenate piece text up to `ccp_text` characters of main document.
fn main_text(word: &[u8], pieces: &[Piece], ccp_text: u32) -> Result<String> {
    let mut text = String::new();

    for piece in pieces {
        if piece.cp_start >= ccp_text {
            break;
        }
        let piece = Piece {
            cp_end: piece.cp_end.min(ccp_text),
            ..*piece
        };
        let count = piece.char_count();

        if piece.compressed {
            let bytes = slice(word, piece.fc as usize / 2, count)
                .ok_or_else(|| out_of_stream(&piece))?;
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.push_str(&decoded);
        } else {
            let bytes = slice(word, piece.fc as usize, count * 2)
                .ok_or_else(|| out_of_stream(&piece))?;
            let units = bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]));
            text.extend(
                char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
            );
        }
    }

    Ok(text)
}

fn out_of_stream(piece: &Piece) -> Error {
    Error::DocParseError(format!(
        "Piece at cp {} lies outside the WordDocument stream",
        piece.cp_start
    ))
}

/// Split decoded document text into trimmed, non-empty paragraphs.
///
/// Field instructions are dropped and field results kept. Paragraph, page,
/// column and line breaks end a line; table cell marks become tabs.
pub fn paragraphs_from_text(text: &str) -> Vec<String> {
    // One entry per open field: true while still in its instruction part.
    let mut fields: Vec<bool> = Vec::new();
    let mut cleaned = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            FIELD_BEGIN => fields.push(true),
            FIELD_SEPARATOR => {
                if let Some(instruction) = fields.last_mut() {
                    *instruction = false;
                }
            }
            FIELD_END => {
                fields.pop();
            }
            _ if fields.iter().any(|&instruction| instruction) => {}
            '\r' | '\n' | '\u{0B}' | '\u{0C}' | '\u{0E}' => cleaned.push('\n'),
            '\u{07}' | '\t' => cleaned.push('\t'),
            '\u{1E}' => cleaned.push('-'),
            c if c.is_control() => {}
            c => cleaned.push(c),
        }
    }

    cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn slice(data: &[u8], start: usize, len: usize) -> Option<&[u8]> {
    data.get(start..start.checked_add(len)?)
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    slice(data, offset, 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| truncated(offset))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    slice(data, offset, 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| truncated(offset))
}

fn truncated(offset: usize) -> Error {
    Error::DocParseError(format!("Unexpected end of data at offset {}", offset))
}
