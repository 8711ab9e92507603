//! Host-level handler settings.

use docunits_core::Result;
use docunits_table::{KeyColumns, SheetSelection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which converters to register and how the tabular one behaves.
///
/// Every field has a default, so `{}` is a valid settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerSettings {
    /// Register the email converter for RFC822 and Outlook messages.
    pub enable_email: bool,
    /// Register the Word converter.
    pub enable_word: bool,
    /// Workbook sheets to convert.
    pub sheets: SheetSelection,
    /// Legacy row-keying mode for tabular input.
    pub key_columns: KeyColumns,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            enable_email: false,
            enable_word: true,
            sheets: SheetSelection::All,
            key_columns: KeyColumns::None,
        }
    }
}

impl HandlerSettings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
