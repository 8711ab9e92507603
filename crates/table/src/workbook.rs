//! Workbook reading: one lazily produced unit per non-empty sheet.

use crate::cells::{header_text, workbook_value};
use crate::rows::{KeyColumns, Table, SHEET_FIELD};
use calamine::{Data, Range, Reader, Xlsx};
use docunits_core::{Error, NormalizedUnit, Result, SourceBlob};
use serde_json::Value;
use std::io::Cursor;

/// Which sheets of a workbook are converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetSelection {
    /// Every sheet, in workbook order.
    #[default]
    All,
    /// Only the last sheet.
    Last,
}

/// Open an XLSX workbook held in memory.
pub fn open(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>> {
    Xlsx::new(Cursor::new(bytes))
        .map_err(|e| Error::CorruptedFile(format!("Failed to open workbook: {}", e)))
}

/// Decode a sheet range into a header row plus data rows.
pub fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let mut table = Table::from_header_row(header.iter().map(header_text).collect());
    table.rows = rows
        .map(|row| row.iter().map(workbook_value).collect::<Vec<Value>>())
        .collect();
    table
}

/// Iterator yielding one unit per non-empty sheet, failing fast on the first bad sheet.
pub struct SheetUnits<'a> {
    blob: &'a SourceBlob,
    workbook: Xlsx<Cursor<&'a [u8]>>,
    names: std::vec::IntoIter<String>,
    key_columns: KeyColumns,
    failed: bool,
}

impl<'a> SheetUnits<'a> {
    pub fn new(blob: &'a SourceBlob, selection: SheetSelection, key_columns: KeyColumns) -> Result<Self> {
        let workbook = open(blob.as_bytes())?;
        let mut names = workbook.sheet_names();
        if selection == SheetSelection::Last {
            names = names.pop().into_iter().collect();
        }
        log::debug!("Workbook sheets selected: {:?}", names);

        Ok(Self {
            blob,
            workbook,
            names: names.into_iter(),
            key_columns,
            failed: false,
        })
    }

    fn sheet_unit(&mut self, name: &str) -> Result<Option<NormalizedUnit>> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| Error::CorruptedFile(format!("Failed to read sheet '{}': {}", name, e)))?;

        let mut table = table_from_range(&range);
        table.reserve_field(SHEET_FIELD);
        let columns = table.headers.clone();
        let rows = table.into_row_maps(Some(name), self.key_columns);
        if rows.is_empty() {
            log::debug!("Sheet '{}' has no rows; skipped", name);
            return Ok(None);
        }

        let mut metadata = self.blob.base_metadata();
        metadata.insert("sheet".to_string(), Value::from(name));
        metadata.insert("rows".to_string(), Value::from(rows.len()));
        metadata.insert("columns".to_string(), Value::from(columns));

        let text = serde_json::to_string(&rows)?;
        Ok(Some(NormalizedUnit::new(text, metadata)))
    }
}

impl Iterator for SheetUnits<'_> {
    type Item = Result<NormalizedUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(name) = self.names.next() {
            match self.sheet_unit(&name) {
                Ok(Some(unit)) => return Some(Ok(unit)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
