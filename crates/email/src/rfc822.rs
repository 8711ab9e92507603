//! RFC822 (`.eml`) messages via `mail-parser`.

use crate::message::{html_to_text, AttachmentInfo, EmailMessage};
use docunits_core::{Error, Result};
use mail_parser::{Addr, Address, Message, MessageParser, MimeHeaders, PartType};

/// Parse raw RFC822 bytes.
pub fn parse_eml(bytes: &[u8]) -> Result<EmailMessage> {
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| Error::EmailParseError("Failed to parse email message".to_string()))?;

    Ok(EmailMessage {
        subject: message.subject().unwrap_or_default().to_string(),
        from: message
            .from()
            .and_then(|address| address.first())
            .map(format_addr)
            .unwrap_or_default(),
        to: addresses(message.to()),
        cc: addresses(message.cc()),
        date: message.date().map(|d| d.to_rfc3339()),
        body: body_text(&message),
        attachments: message
            .attachments()
            .map(|part| AttachmentInfo {
                filename: part.attachment_name().unwrap_or("unnamed").to_string(),
                size: part.len(),
            })
            .collect(),
    })
}

/// Plain-text parts when present, otherwise the HTML parts stripped to text.
fn body_text(message: &Message) -> String {
    let plain: Vec<&str> = message
        .text_bodies()
        .filter_map(|part| match &part.body {
            PartType::Text(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect();
    if !plain.is_empty() {
        return plain.join("\n");
    }

    let html: Vec<String> = message
        .html_bodies()
        .filter_map(|part| match &part.body {
            PartType::Html(html) => Some(html_to_text(html)),
            _ => None,
        })
        .collect();
    if html.is_empty() {
        log::debug!("Message has no text or HTML body");
    }
    html.join("\n")
}

fn addresses(address: Option<&Address>) -> Vec<String> {
    address
        .map(|list| list.iter().map(format_addr).collect())
        .unwrap_or_default()
}

fn format_addr(addr: &Addr) -> String {
    match (addr.name(), addr.address()) {
        (Some(name), Some(address)) => format!("{} <{}>", name, address),
        (Some(name), None) => name.to_string(),
        (None, address) => address.unwrap_or_default().to_string(),
    }
}
