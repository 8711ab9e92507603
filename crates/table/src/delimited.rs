//! Comma-separated input: a single table whose first record is the header.

use crate::cells::csv_value;
use crate::rows::Table;
use docunits_core::{Error, Result};
use serde_json::Value;

/// Decode CSV bytes into a table. Non-UTF-8 bytes are replaced, not rejected.
pub fn read_table(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let header = reader
        .byte_headers()
        .map_err(|e| Error::Csv(format!("Failed to read header: {}", e)))?
        .iter()
        .map(|field| {
            let name = String::from_utf8_lossy(field);
            let name = name.trim_start_matches('\u{feff}');
            (!name.trim().is_empty()).then(|| name.to_string())
        })
        .collect();

    let mut table = Table::from_header_row(header);
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|e| Error::Csv(format!("Record {}: {}", idx + 1, e)))?;
        let values: Vec<Value> = record
            .iter()
            .map(|field| csv_value(&String::from_utf8_lossy(field)))
            .collect();
        table.rows.push(values);
    }

    log::debug!(
        "CSV decoded: {} columns, {} records",
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}
