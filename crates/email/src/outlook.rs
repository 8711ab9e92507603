//! Outlook `.msg` messages via `msg_parser`.
//!
//! `msg_parser` only reads from a path, so the bytes go through a named
//! temporary file that is removed when it drops, on success or failure.

use crate::message::{AttachmentInfo, EmailMessage};
use docunits_core::{Error, Result};
use msg_parser::{Outlook, Person};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Parse MSG bytes using the system temp directory.
pub fn parse_msg(bytes: &[u8]) -> Result<EmailMessage> {
    parse_msg_in(bytes, &std::env::temp_dir())
}

/// Parse MSG bytes, staging them in `dir`.
pub fn parse_msg_in(bytes: &[u8], dir: &Path) -> Result<EmailMessage> {
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    let outlook = Outlook::from_path(staged.path())
        .map_err(|e| Error::EmailParseError(format!("Failed to parse MSG file: {}", e)))?;
    log::debug!("Parsed MSG with {} attachments", outlook.attachments.len());

    Ok(from_outlook(outlook))
}

fn from_outlook(outlook: Outlook) -> EmailMessage {
    let attachments = outlook
        .attachments
        .iter()
        .map(|att| AttachmentInfo {
            filename: if att.file_name.is_empty() {
                att.display_name.clone()
            } else {
                att.file_name.clone()
            },
            // payload holds the encoded attachment data
            size: att.payload.len(),
        })
        .collect();

    EmailMessage {
        subject: outlook.subject,
        from: format_person(&outlook.sender),
        to: outlook.to.iter().map(format_person).collect(),
        cc: outlook.cc.iter().map(format_person).collect(),
        date: Some(outlook.headers.date).filter(|d| !d.is_empty()),
        body: outlook.body,
        attachments,
    }
}

fn format_person(person: &Person) -> String {
    display_address(&person.name, &person.email)
}

fn display_address(name: &str, email: &str) -> String {
    match (name.is_empty(), email.is_empty()) {
        (false, false) if name != email => format!("{} <{}>", name, email),
        (false, _) => name.to_string(),
        (true, _) => email.to_string(),
    }
}
