//! Tabular converter.
//!
//! Reads CSV text or an XLSX workbook and emits one normalized unit per
//! non-empty sheet. Each unit's text is a JSON array of row mappings keyed by
//! the sheet's header row:
//!
//! ```text
//! [{"id":1,"val":"a","_sheet":"Q1"}]
//! ```

mod cells;
mod delimited;
mod rows;
mod workbook;

pub use rows::{column_names, KeyColumns, Table, SHEET_FIELD};
pub use workbook::{SheetSelection, SheetUnits};

use docunits_core::{mime, Converter, NormalizedUnit, Result, SourceBlob, UnitIter};
use serde_json::Value;

const SUPPORTED_TYPES: &[&str] = &[mime::CSV, mime::XLSX];

/// Sheet marker recorded in the metadata of CSV units.
pub const CSV_SHEET: &str = "csv";

/// Converter for CSV files and XLSX workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableConverter {
    sheets: SheetSelection,
    key_columns: KeyColumns,
}

impl TableConverter {
    /// Create a converter that keeps every row of every sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose which workbook sheets are converted.
    pub fn with_sheets(mut self, sheets: SheetSelection) -> Self {
        self.sheets = sheets;
        self
    }

    /// Choose the legacy row-keying mode.
    pub fn with_key_columns(mut self, key_columns: KeyColumns) -> Self {
        self.key_columns = key_columns;
        self
    }

    pub fn sheets(&self) -> SheetSelection {
        self.sheets
    }

    pub fn key_columns(&self) -> KeyColumns {
        self.key_columns
    }

    /// Convert CSV bytes; `None` when there are no data rows.
    fn csv_unit(&self, blob: &SourceBlob) -> Result<Option<NormalizedUnit>> {
        let table = delimited::read_table(blob.as_bytes())?;
        let columns = table.headers.clone();
        let rows = table.into_row_maps(None, self.key_columns);
        if rows.is_empty() {
            log::debug!("CSV has no data rows; nothing emitted");
            return Ok(None);
        }

        let mut metadata = blob.base_metadata();
        metadata.insert("sheet".to_string(), Value::from(CSV_SHEET));
        metadata.insert("rows".to_string(), Value::from(rows.len()));
        metadata.insert("columns".to_string(), Value::from(columns));

        Ok(Some(NormalizedUnit::new(serde_json::to_string(&rows)?, metadata)))
    }
}

impl Converter for TableConverter {
    fn name(&self) -> &str {
        "table"
    }

    fn supported_types(&self) -> &[&str] {
        SUPPORTED_TYPES
    }

    fn lazy_convert<'a>(&'a self, blob: &'a SourceBlob) -> Result<UnitIter<'a>> {
        self.ensure_accepts(blob)?;

        if blob.essence() == mime::CSV {
            return Ok(Box::new(
                std::iter::once_with(move || self.csv_unit(blob)).filter_map(Result::transpose),
            ));
        }

        let sheets = SheetUnits::new(blob, self.sheets, self.key_columns)?;
        Ok(Box::new(sheets))
    }
}
