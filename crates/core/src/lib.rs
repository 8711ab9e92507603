//! Core domain types, the error type, and the MIME-keyed converter registry
//! shared by every document converter.

pub mod converter;
pub mod error;
pub mod mime;
pub mod types;

pub use converter::{Converter, ConverterRegistry, UnitIter};
pub use error::{Error, Result};
pub use types::{
    ExtractedSlide, Metadata, NormalizedUnit, Presentation, PresentationFormat, RowMap,
    SlideShape, SourceBlob,
};
