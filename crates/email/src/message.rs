//! Format-neutral view of an email message and its text rendering.

use docunits_core::{Metadata, SourceBlob};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An attachment summary: name and size only, never the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub filename: String,
    pub size: usize,
}

/// The fields extracted from one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub date: Option<String>,
    pub body: String,
    pub attachments: Vec<AttachmentInfo>,
}

impl EmailMessage {
    /// Render the message as a readable block:
    ///
    /// ```text
    /// From: Ann <ann@example.com>
    /// To: bob@example.com
    /// Subject: Hi
    ///
    /// body
    ///
    /// Attachments:
    /// - a.pdf (12 bytes)
    /// ```
    ///
    /// `To`/`Cc` lines and the attachment list are left out when empty.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("From: {}", self.from)];
        if !self.to.is_empty() {
            lines.push(format!("To: {}", self.to.join(", ")));
        }
        if !self.cc.is_empty() {
            lines.push(format!("Cc: {}", self.cc.join(", ")));
        }
        lines.push(format!("Subject: {}", self.subject));
        lines.push(String::new());
        lines.push(self.body.trim().to_string());

        if !self.attachments.is_empty() {
            lines.push(String::new());
            lines.push("Attachments:".to_string());
            for attachment in &self.attachments {
                lines.push(format!("- {} ({} bytes)", attachment.filename, attachment.size));
            }
        }

        lines.join("\n")
    }

    /// Unit metadata: the blob's base fields plus the message headers.
    pub fn metadata(&self, blob: &SourceBlob) -> Metadata {
        let mut metadata = blob.base_metadata();
        metadata.insert("subject".to_string(), Value::from(self.subject.as_str()));
        metadata.insert("from".to_string(), Value::from(self.from.as_str()));
        metadata.insert("to".to_string(), Value::from(self.to.clone()));
        metadata.insert("cc".to_string(), Value::from(self.cc.clone()));
        if let Some(date) = &self.date {
            metadata.insert("date".to_string(), Value::from(date.as_str()));
        }
        let attachments: Vec<Value> = self
            .attachments
            .iter()
            .map(|a| serde_json::json!({ "filename": a.filename, "size": a.size }))
            .collect();
        metadata.insert("attachments".to_string(), Value::Array(attachments));
        metadata
    }
}

/// Reduce an HTML body to plain text.
#[cfg(feature = "html")]
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 80)
}

/// Without the `html` feature the markup is kept as-is.
#[cfg(not(feature = "html"))]
pub fn html_to_text(html: &str) -> String {
    log::warn!("HTML body kept raw: built without the `html` feature");
    html.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            subject: "Quarterly numbers".to_string(),
            from: "Ann <ann@example.com>".to_string(),
            to: vec!["bob@example.com".to_string(), "cy@example.com".to_string()],
            body: "See attached.\n".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_without_cc_or_attachments() {
        assert_eq!(
            message().render(),
            "From: Ann <ann@example.com>\n\
             To: bob@example.com, cy@example.com\n\
             Subject: Quarterly numbers\n\
             \n\
             See attached."
        );
    }

    #[test]
    fn test_render_with_cc_and_attachments() {
        let mut msg = message();
        msg.to.clear();
        msg.cc = vec!["dee@example.com".to_string()];
        msg.attachments = vec![AttachmentInfo {
            filename: "q3.xlsx".to_string(),
            size: 2048,
        }];

        assert_eq!(
            msg.render(),
            "From: Ann <ann@example.com>\n\
             Cc: dee@example.com\n\
             Subject: Quarterly numbers\n\
             \n\
             See attached.\n\
             \n\
             Attachments:\n\
             - q3.xlsx (2048 bytes)"
        );
    }

    #[test]
    fn test_metadata_fields() {
        let mut msg = message();
        msg.date = Some("2024-03-01T09:00:00Z".to_string());
        let blob = SourceBlob::new(Vec::new(), "message/rfc822").with_source("a.eml");

        let metadata = msg.metadata(&blob);
        let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["source", "mimetype", "subject", "from", "to", "cc", "date", "attachments"]
        );
        assert_eq!(metadata["to"], serde_json::json!(["bob@example.com", "cy@example.com"]));
        assert_eq!(metadata["attachments"], serde_json::json!([]));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_html_to_text_strips_markup() {
        let text = html_to_text("<p>Hello <b>there</b></p>");
        assert!(text.contains("Hello"));
        assert!(!text.contains("<p>"));
    }
}
