//! Email converter.
//!
//! Turns a single message, RFC822 (`.eml`) or Outlook (`.msg`), into one
//! readable text block with the headers, the best plain-text body and an
//! attachment summary. Outlook support sits behind the `outlook` feature.

pub mod message;
#[cfg(feature = "outlook")]
pub mod outlook;
pub mod rfc822;

pub use message::{AttachmentInfo, EmailMessage};

use docunits_core::{mime, Converter, Error, NormalizedUnit, Result, SourceBlob, UnitIter};

const SUPPORTED_TYPES: &[&str] = &[mime::RFC822, mime::OUTLOOK];
const SUPPORTED_EXTENSIONS: &[&str] = &["eml", "msg"];

/// OLE compound file signature that starts every `.msg` file.
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Converter for single email messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailConverter;

impl EmailConverter {
    pub fn new() -> Self {
        Self
    }

    /// Whether the blob holds an Outlook message rather than RFC822 text.
    fn is_outlook(&self, blob: &SourceBlob) -> bool {
        blob.as_bytes().starts_with(CFB_MAGIC)
            || blob.essence() == mime::OUTLOOK
            || (blob.essence() != mime::RFC822 && blob.extension().as_deref() == Some("msg"))
    }

    /// Parse the blob with the backend matching its container.
    pub fn parse(&self, blob: &SourceBlob) -> Result<EmailMessage> {
        self.ensure_accepts(blob)?;
        if self.is_outlook(blob) {
            log::debug!("Parsing message as Outlook MSG");
            parse_outlook(blob.as_bytes())
        } else {
            log::debug!("Parsing message as RFC822");
            rfc822::parse_eml(blob.as_bytes())
        }
    }
}

#[cfg(feature = "outlook")]
fn parse_outlook(bytes: &[u8]) -> Result<EmailMessage> {
    outlook::parse_msg(bytes)
}

#[cfg(not(feature = "outlook"))]
fn parse_outlook(_bytes: &[u8]) -> Result<EmailMessage> {
    Err(Error::MissingDependency("msg_parser".to_string()))
}

impl Converter for EmailConverter {
    fn name(&self) -> &str {
        "email"
    }

    fn supported_types(&self) -> &[&str] {
        SUPPORTED_TYPES
    }

    fn accepts(&self, blob: &SourceBlob) -> bool {
        mime::matches_any(blob.mimetype(), SUPPORTED_TYPES)
            || blob
                .extension()
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }

    fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
        self.ensure_accepts(blob)?;
        Ok(Box::new(std::iter::once_with(move || {
            let message = self.parse(blob)?;
            Ok(NormalizedUnit::new(message.render(), message.metadata(blob)))
        })))
    }
}

/// Convenience wrapper for one-shot conversion.
pub fn convert_email(blob: &SourceBlob) -> Result<NormalizedUnit> {
    EmailConverter::new()
        .convert(blob)?
        .pop()
        .ok_or_else(|| Error::EmailParseError("message produced no unit".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "From: Ann <ann@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Status\r\n\
Content-Type: text/plain\r\n\
\r\n\
All green.\r\n";

    #[test]
    fn test_convert_eml() {
        let blob = SourceBlob::new(RAW, mime::RFC822).with_source("status.eml");
        let unit = convert_email(&blob).unwrap();

        assert_eq!(
            unit.text,
            "From: Ann <ann@example.com>\nTo: bob@example.com\nSubject: Status\n\nAll green."
        );
        assert_eq!(unit.metadata["subject"], "Status");
        assert_eq!(unit.metadata["source"], "status.eml");
        assert_eq!(unit.metadata["cc"], serde_json::json!([]));
    }

    #[test]
    fn test_accepts_by_extension() {
        let blob = SourceBlob::new(RAW, "application/octet-stream").with_source("status.EML");
        assert!(EmailConverter::new().accepts(&blob));
        assert_eq!(convert_email(&blob).unwrap().metadata["subject"], "Status");
    }

    #[test]
    fn test_unsupported_mime_and_extension() {
        let blob = SourceBlob::new(RAW, "text/plain").with_source("status.txt");
        let err = EmailConverter::new().lazy_convert(&blob).err().unwrap();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_outlook_detection() {
        let converter = EmailConverter::new();
        assert!(converter.is_outlook(&SourceBlob::new(CFB_MAGIC.to_vec(), mime::RFC822)));
        assert!(converter.is_outlook(&SourceBlob::new(Vec::new(), mime::OUTLOOK)));
        assert!(converter.is_outlook(
            &SourceBlob::new(Vec::new(), "application/octet-stream").with_source("a.msg")
        ));
        assert!(!converter.is_outlook(&SourceBlob::new(RAW, mime::RFC822).with_source("a.msg")));
    }

    #[cfg(feature = "outlook")]
    #[test]
    fn test_corrupt_msg_fails() {
        let mut bytes = CFB_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let blob = SourceBlob::new(bytes, mime::OUTLOOK);
        assert!(matches!(
            EmailConverter::new().convert(&blob),
            Err(Error::EmailParseError(_))
        ));
    }

    #[cfg(not(feature = "outlook"))]
    #[test]
    fn test_msg_without_outlook_feature() {
        let blob = SourceBlob::new(CFB_MAGIC.to_vec(), mime::OUTLOOK);
        assert!(matches!(
            EmailConverter::new().convert(&blob),
            Err(Error::MissingDependency(_))
        ));
    }
}
