//! The per-format conversion capability and the MIME-keyed registry the host dispatches through.

use crate::error::{Error, Result};
use crate::types::{NormalizedUnit, SourceBlob};
use std::collections::HashMap;
use std::sync::Arc;

/// Lazy sequence of units produced by one conversion call.
pub type UnitIter<'a> = Box<dyn Iterator<Item = Result<NormalizedUnit>> + 'a>;

/// A format handler: turns one source blob into normalized units.
///
/// Implementations hold only immutable configuration, so a single instance
/// can serve any number of calls.
pub trait Converter: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// MIME types this converter handles.
    fn supported_types(&self) -> &[&str];

    /// Whether this converter can handle the blob.
    fn accepts(&self, blob: &SourceBlob) -> bool {
        crate::mime::matches_any(blob.mimetype(), self.supported_types())
    }

    /// Validate the blob and return a lazy sequence of units.
    ///
    /// MIME mismatches fail here, before any decoding happens.
    fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>>;

    /// Convert eagerly, failing on the first unit error.
    fn convert(&self, blob: &SourceBlob) -> Result<Vec<NormalizedUnit>> {
        self.lazy_convert(blob)?.collect()
    }

    /// Return `UnsupportedFormat` unless the blob is accepted.
    fn ensure_accepts(&self, blob: &SourceBlob) -> Result<()> {
        if self.accepts(blob) {
            Ok(())
        } else {
            Err(Error::unsupported(self.name(), blob.mimetype()))
        }
    }
}

/// Mapping from MIME type to shared converter instance.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    handlers: HashMap<String, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every supported type of `converter` to it. Later registrations win.
    pub fn register(&mut self, converter: Arc<dyn Converter>) {
        for mime in converter.supported_types() {
            self.register_as(mime, Arc::clone(&converter));
        }
    }

    /// Map a single MIME type to `converter`.
    pub fn register_as(&mut self, mimetype: &str, converter: Arc<dyn Converter>) {
        let key = crate::mime::essence(mimetype);
        if let Some(previous) = self.handlers.insert(key.clone(), converter) {
            log::debug!("Replacing '{}' handler for {}", previous.name(), key);
        }
    }

    /// Get the converter registered for a MIME type.
    pub fn get(&self, mimetype: &str) -> Option<Arc<dyn Converter>> {
        self.handlers.get(&crate::mime::essence(mimetype)).cloned()
    }

    /// Whether a MIME type has a handler.
    pub fn contains(&self, mimetype: &str) -> bool {
        self.handlers.contains_key(&crate::mime::essence(mimetype))
    }

    /// Registered MIME types, sorted.
    pub fn mime_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Merge another registry into this one; entries in `other` win.
    pub fn extend(&mut self, other: ConverterRegistry) {
        self.handlers.extend(other.handlers);
    }

    /// Dispatch a blob by its MIME type and return its units lazily.
    pub fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
        let converter = self
            .handlers
            .get(&blob.essence())
            .ok_or_else(|| Error::UnsupportedFormat(format!("no handler for '{}'", blob.mimetype())))?;
        log::debug!("Dispatching {} to '{}'", blob.mimetype(), converter.name());
        converter.lazy_convert(blob)
    }

    /// Dispatch a blob by its MIME type and collect its units.
    pub fn convert(&self, blob: &SourceBlob) -> Result<Vec<NormalizedUnit>> {
        self.lazy_convert(blob)?.collect()
    }

    /// The raw MIME → converter mapping.
    pub fn into_handlers(self) -> HashMap<String, Arc<dyn Converter>> {
        self.handlers
    }
}

impl From<HashMap<String, Arc<dyn Converter>>> for ConverterRegistry {
    fn from(handlers: HashMap<String, Arc<dyn Converter>>) -> Self {
        let mut registry = Self::new();
        for (mime, converter) in handlers {
            registry.register_as(&mime, converter);
        }
        registry
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for mime in self.mime_types() {
            map.entry(&mime, &self.handlers[mime].name());
        }
        map.finish()
    }
}
