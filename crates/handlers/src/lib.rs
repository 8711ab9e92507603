//! Host-facing entry point: builds the MIME → converter registry.
//!
//! ```no_run
//! use docunits::{default_registry, HandlerSettings, SourceBlob};
//!
//! let registry = default_registry(&HandlerSettings::default());
//! let blob = SourceBlob::from_path("report.xlsx", docunits::mime::XLSX)?;
//! for unit in registry.lazy_convert(&blob)? {
//!     println!("{}", unit?.text);
//! }
//! # Ok::<(), docunits::Error>(())
//! ```

pub mod settings;

pub use docunits_core::{
    mime, Converter, ConverterRegistry, Error, Metadata, NormalizedUnit, Result, RowMap,
    SourceBlob, UnitIter,
};
#[cfg(feature = "email")]
pub use docunits_email::EmailConverter;
pub use docunits_docx::WordConverter;
pub use docunits_slides::{convert_presentation, PresentationConverter};
pub use docunits_table::{KeyColumns, SheetSelection, TableConverter};
pub use settings::HandlerSettings;

use std::collections::HashMap;
use std::sync::Arc;

/// Build a registry holding every converter the settings enable.
pub fn default_registry(settings: &HandlerSettings) -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();

    registry.register(Arc::new(
        TableConverter::new()
            .with_sheets(settings.sheets)
            .with_key_columns(settings.key_columns),
    ));
    registry.register(Arc::new(PresentationConverter::new()));

    if settings.enable_word {
        registry.register(Arc::new(WordConverter::new()));
    }

    if settings.enable_email {
        register_email(&mut registry);
    }

    log::debug!("Registered handlers: {:?}", registry);
    registry
}

#[cfg(feature = "email")]
fn register_email(registry: &mut ConverterRegistry) {
    registry.register(Arc::new(EmailConverter::new()));
}

#[cfg(not(feature = "email"))]
fn register_email(_registry: &mut ConverterRegistry) {
    log::warn!("Email handlers requested but this build has no `email` feature");
}

/// Merge the converters into a host's existing MIME → converter mapping.
///
/// Existing entries for other MIME types are kept; entries for types handled
/// here are replaced.
pub fn install_handlers(
    existing: HashMap<String, Arc<dyn Converter>>,
    settings: &HandlerSettings,
) -> HashMap<String, Arc<dyn Converter>> {
    let mut registry = ConverterRegistry::from(existing);
    registry.extend(default_registry(settings));
    registry.into_handlers()
}

/// MIME type for a file extension, for hosts that only know a path.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    mime::for_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Converter for Plain {
        fn name(&self) -> &str {
            "plain"
        }

        fn supported_types(&self) -> &[&str] {
            &["text/plain", "text/csv"]
        }

        fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
            self.ensure_accepts(blob)?;
            Ok(Box::new(std::iter::empty()))
        }
    }

    #[test]
    fn test_default_registry_types() {
        let registry = default_registry(&HandlerSettings::default());
        assert_eq!(
            registry.mime_types(),
            vec![
                mime::MSWORD,
                mime::PPT_LEGACY,
                mime::PPT,
                mime::PPTX,
                mime::XLSX,
                mime::DOCX,
                mime::CSV,
            ]
        );
        assert!(!registry.contains(mime::RFC822));
    }

    #[test]
    fn test_word_can_be_disabled() {
        let settings = HandlerSettings {
            enable_word: false,
            ..Default::default()
        };
        let registry = default_registry(&settings);
        assert!(!registry.contains(mime::DOCX));
        assert!(!registry.contains(mime::MSWORD));
    }

    #[cfg(feature = "email")]
    #[test]
    fn test_email_opt_in() {
        let settings = HandlerSettings {
            enable_email: true,
            ..Default::default()
        };
        let registry = default_registry(&settings);
        assert_eq!(registry.get(mime::RFC822).unwrap().name(), "email");
        assert_eq!(registry.get(mime::OUTLOOK).unwrap().name(), "email");
    }

    #[test]
    fn test_install_handlers_overrides_and_keeps() {
        let mut existing: HashMap<String, Arc<dyn Converter>> = HashMap::new();
        existing.insert("text/plain".to_string(), Arc::new(Plain));
        existing.insert(mime::CSV.to_string(), Arc::new(Plain));

        let handlers = install_handlers(existing, &HandlerSettings::default());
        assert_eq!(handlers["text/plain"].name(), "plain");
        assert_eq!(handlers[mime::CSV].name(), "table");
        assert_eq!(handlers[mime::PPT_LEGACY].name(), "presentation");
    }

    #[test]
    fn test_settings_flow_into_table_converter() {
        let settings = HandlerSettings {
            key_columns: KeyColumns::First,
            ..Default::default()
        };
        let registry = default_registry(&settings);
        let blob = SourceBlob::new(b"k,v\nx,1\nx,2\n".to_vec(), mime::CSV);

        let units = registry.convert(&blob).unwrap();
        assert_eq!(units[0].metadata["rows"], 1);
    }

    #[test]
    fn test_unknown_mime_is_unsupported() {
        let registry = default_registry(&HandlerSettings::default());
        let blob = SourceBlob::new(Vec::new(), "application/pdf");
        assert!(registry.convert(&blob).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension(".PPTX"), Some(mime::PPTX));
        assert_eq!(mime_for_extension("eml"), Some(mime::RFC822));
        assert_eq!(mime_for_extension("doc"), Some(mime::MSWORD));
        assert_eq!(mime_for_extension("pdf"), None);
    }
}
