//! MIME type constants recognized by the converters.

pub const CSV: &str = "text/csv";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PPT: &str = "application/vnd.ms-powerpoint";
pub const PPT_LEGACY: &str = "application/powerpoint";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MSWORD: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const RFC822: &str = "message/rfc822";
pub const OUTLOOK: &str = "application/vnd.ms-outlook";

/// Strip parameters (`; charset=...`) and lower-case a MIME type.
pub fn essence(mimetype: &str) -> String {
    mimetype
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Whether `mimetype` matches one of `types`, ignoring case and parameters.
pub fn matches_any(mimetype: &str, types: &[&str]) -> bool {
    let essence = essence(mimetype);
    types.iter().any(|t| t.eq_ignore_ascii_case(&essence))
}

/// Map a file extension to a recognized MIME type.
pub fn for_extension(ext: &str) -> Option<&'static str> {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "csv" => Some(CSV),
        "xlsx" => Some(XLSX),
        "ppt" => Some(PPT),
        "pptx" => Some(PPTX),
        "doc" => Some(MSWORD),
        "docx" => Some(DOCX),
        "eml" => Some(RFC822),
        "msg" => Some(OUTLOOK),
        _ => None,
    }
}
