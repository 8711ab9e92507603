//! Row mapping construction shared by the CSV and workbook readers.

use docunits_core::RowMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Provenance field appended to every workbook row.
pub const SHEET_FIELD: &str = "_sheet";

/// Legacy row-keying mode.
///
/// Rows were once stored in a dictionary keyed by their cell values, which
/// silently lost rows on key collisions. `None` keeps every row; the other
/// modes reproduce the collision behavior on request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyColumns {
    /// Every non-empty row is kept.
    #[default]
    None,
    /// A row is dropped when its first-column value already keyed an earlier row.
    First,
    /// A row is dropped when every one of its values already keyed an earlier row.
    All,
}

/// A decoded sheet: header names plus raw data rows.
#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table whose first row names the columns.
    pub fn from_header_row(header: Vec<Option<String>>) -> Self {
        Self {
            headers: column_names(header),
            rows: Vec::new(),
        }
    }

    /// Rename any column that would collide with `field` (`field.1`, ...).
    pub fn reserve_field(&mut self, field: &str) {
        if !self.headers.iter().any(|h| h == field) {
            return;
        }
        let names = std::iter::once(Some(field.to_string()))
            .chain(self.headers.drain(..).map(Some))
            .collect();
        self.headers = column_names(names).split_off(1);
        log::debug!("Column '{}' renamed to keep the provenance field", field);
    }

    /// Turn data rows into row mappings, skipping rows with no values.
    pub fn into_row_maps(mut self, sheet: Option<&str>, key_columns: KeyColumns) -> Vec<RowMap> {
        if sheet.is_some() {
            self.reserve_field(SHEET_FIELD);
        }
        let mut seen: HashSet<String> = HashSet::new();
        let width = self.headers.len();
        let mut maps = Vec::with_capacity(self.rows.len());

        for (idx, mut values) in self.rows.into_iter().enumerate() {
            if values.iter().all(Value::is_null) {
                continue;
            }
            if values.len() > width {
                log::debug!(
                    "Row {} has {} cells but only {} columns; extra cells dropped",
                    idx + 1,
                    values.len(),
                    width
                );
            }
            values.resize(width, Value::Null);

            if !keep_row(&values, key_columns, &mut seen) {
                log::debug!("Row {} dropped: every key already taken", idx + 1);
                continue;
            }

            let mut row: RowMap = self.headers.iter().cloned().zip(values).collect();
            if let Some(sheet) = sheet {
                row.insert(SHEET_FIELD.to_string(), Value::String(sheet.to_string()));
            }
            maps.push(row);
        }

        maps
    }
}

/// Apply the keying mode, registering this row's keys when it is kept.
fn keep_row(values: &[Value], key_columns: KeyColumns, seen: &mut HashSet<String>) -> bool {
    match key_columns {
        KeyColumns::None => true,
        KeyColumns::First => match values.first().filter(|v| !v.is_null()) {
            Some(value) => seen.insert(key_of(value)),
            None => true,
        },
        KeyColumns::All => {
            let mut claimed_any = false;
            for value in values.iter().filter(|v| !v.is_null()) {
                claimed_any |= seen.insert(key_of(value));
            }
            claimed_any
        }
    }
}

/// JSON rendering, so `"1"` and `1` stay distinct keys.
fn key_of(value: &Value) -> String {
    value.to_string()
}

/// Name columns from a header row.
///
/// Blank headers become `Unnamed: <index>`; repeated names get `.1`, `.2`, ...
/// suffixes so that no column shadows another.
pub fn column_names(header: Vec<Option<String>>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(header.len());

    for (idx, raw) in header.into_iter().enumerate() {
        let base = match raw.map(|s| s.trim().to_string()) {
            Some(name) if !name.is_empty() => name,
            _ => format!("Unnamed: {}", idx),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        taken.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header(names: &[&str]) -> Vec<Option<String>> {
        names
            .iter()
            .map(|n| (!n.is_empty()).then(|| n.to_string()))
            .collect()
    }

    fn table(names: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::from_header_row(header(names));
        table.rows = rows;
        table
    }

    #[test]
    fn test_column_names_fill_blanks_and_dedupe() {
        assert_eq!(
            column_names(header(&["id", "", "id", "id", "name"])),
            vec!["id", "Unnamed: 1", "id.1", "id.2", "name"]
        );
    }

    #[test]
    fn test_rows_keyed_by_headers_with_sheet() {
        let rows = table(&["id", "val"], vec![vec![json!(1), json!("a")]])
            .into_row_maps(Some("Q1"), KeyColumns::None);

        assert_eq!(
            serde_json::to_string(&rows).unwrap(),
            r#"[{"id":1,"val":"a","_sheet":"Q1"}]"#
        );
    }

    #[test]
    fn test_short_rows_padded_with_null_and_blank_rows_skipped() {
        let rows = table(
            &["a", "b"],
            vec![vec![json!(1)], vec![Value::Null, Value::Null], vec![json!(2), json!(3), json!(4)]],
        )
        .into_row_maps(None, KeyColumns::None);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["b"], Value::Null);
        assert_eq!(rows[1].len(), 2);
        assert!(!rows[0].contains_key(SHEET_FIELD));
    }

    #[test]
    fn test_duplicate_rows_are_kept_by_default() {
        let rows = table(&["k"], vec![vec![json!("x")], vec![json!("x")]])
            .into_row_maps(None, KeyColumns::None);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_first_column_keys_drop_repeats() {
        let rows = table(
            &["k", "v"],
            vec![
                vec![json!("x"), json!(1)],
                vec![json!("x"), json!(2)],
                vec![Value::Null, json!(3)],
                vec![json!("y"), json!(4)],
            ],
        )
        .into_row_maps(None, KeyColumns::First);

        let kept: Vec<&Value> = rows.iter().map(|r| &r["v"]).collect();
        assert_eq!(kept, vec![&json!(1), &json!(3), &json!(4)]);
    }

    // Rows whose every value already keyed an earlier row vanish under
    // `KeyColumns::All`; this is the collision loss the mode exists to reproduce.
    #[test]
    fn test_all_column_keys_drop_fully_shadowed_rows() {
        let rows = table(
            &["a", "b"],
            vec![
                vec![json!("x"), json!("y")],
                vec![json!("y"), json!("x")],
                vec![json!("x"), json!("z")],
            ],
        )
        .into_row_maps(None, KeyColumns::All);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"], json!("z"));
    }

    #[test]
    fn test_key_of_keeps_types_apart() {
        assert_ne!(key_of(&json!("1")), key_of(&json!(1)));
        assert_ne!(key_of(&json!("true")), key_of(&json!(true)));
        assert_eq!(key_of(&json!(1)), key_of(&json!(1)));
    }

    #[test]
    fn test_first_column_keys_compare_by_type() {
        let rows = table(&["k"], vec![vec![json!("1")], vec![json!(1)], vec![json!(1)]])
            .into_row_maps(None, KeyColumns::First);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_column_named_sheet_field_is_renamed() {
        let rows = table(&["_sheet", "v"], vec![vec![json!("mine"), json!(1)]])
            .into_row_maps(Some("Q1"), KeyColumns::None);

        assert_eq!(
            serde_json::to_string(&rows).unwrap(),
            r#"[{"_sheet.1":"mine","v":1,"_sheet":"Q1"}]"#
        );
    }

    #[test]
    fn test_reserve_field_without_collision_is_noop() {
        let mut t = table(&["a", "b"], Vec::new());
        t.reserve_field(SHEET_FIELD);
        assert_eq!(t.headers, vec!["a", "b"]);

        // Without a sheet the header is a plain column.
        let rows = table(&["_sheet"], vec![vec![json!("x")]]).into_row_maps(None, KeyColumns::None);
        assert_eq!(rows[0][SHEET_FIELD], json!("x"));
    }

    #[test]
    fn test_row_map_round_trips_through_json() {
        let rows = table(
            &["id", "price", "ok", "note"],
            vec![vec![json!(7), json!(2.5), json!(true), Value::Null]],
        )
        .into_row_maps(Some("S"), KeyColumns::None);

        let text = serde_json::to_string(&rows).unwrap();
        let parsed: Vec<RowMap> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, rows);
    }
}
