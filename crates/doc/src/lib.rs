//! Legacy Word (OLE/CFB) parser backend for paragraph text extraction.
//!
//! Reads Word 97-2003 `.doc` files. Only the main document text is
//! extracted; headers, footnotes and comments are left out.

pub mod parser;

pub use parser::DocParser;
