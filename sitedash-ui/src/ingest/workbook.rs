//! Workbook decoding
//!
//! Turns an uploaded byte blob into ordered named sheets of flat rows.
//! Two formats are accepted: xlsx (sniffed by ZIP magic, decoded with
//! calamine) and JSON workbooks of the shape
//! `{"Sheet Name": [ {"Col": value, ...}, ... ]}`.
//!
//! Failure semantics: a blob that cannot be decoded at all is a
//! [`Error::Workbook`] and aborts ingestion before any state mutation.
//! A single sheet that fails to decode is skipped with a warning, and
//! sheets yielding zero rows are dropped entirely.

use calamine::{Data, Reader, Xlsx};
use sitedash_common::rows::SheetRow;
use sitedash_common::{Error, Result};
use std::io::Cursor;
use tracing::{debug, warn};

/// ZIP local-file-header magic; xlsx files are ZIP containers
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// One decoded sheet, in workbook order
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

/// Decode a workbook blob into its non-empty sheets
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<ParsedSheet>> {
    if bytes.is_empty() {
        return Err(Error::Workbook("empty upload".to_string()));
    }

    let sheets = if bytes.starts_with(&ZIP_MAGIC) {
        parse_xlsx(bytes)?
    } else {
        parse_json(bytes)?
    };

    // Zero-row sheets are dropped entirely, not just left unclassified.
    let sheets: Vec<ParsedSheet> = sheets.into_iter().filter(|s| !s.rows.is_empty()).collect();

    debug!(
        sheet_count = sheets.len(),
        "Workbook decoded: {}",
        sheets
            .iter()
            .map(|s| format!("{} ({} rows)", s.name, s.rows.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(sheets)
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<ParsedSheet>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor)
        .map_err(|e| Error::Workbook(format!("not a readable xlsx workbook: {e}")))?;

    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                // Per-sheet decode failure is not an ingestion failure;
                // the role is simply absent from the processed set.
                warn!(sheet = %name, error = %e, "Skipping undecodable sheet");
                continue;
            }
        };

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row.iter().map(cell_to_header).collect(),
            None => continue,
        };

        let mut rows = Vec::new();
        for data_row in rows_iter {
            let mut row = SheetRow::new();
            for (header, cell) in headers.iter().zip(data_row.iter()) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = cell_to_value(cell) {
                    row.set(header, value);
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        sheets.push(ParsedSheet { name, rows });
    }

    Ok(sheets)
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Option<serde_json::Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(serde_json::Value::String(s.clone())),
        Data::Int(i) => Some(serde_json::Value::from(*i)),
        Data::Float(f) => Some(serde_json::Value::from(*f)),
        Data::Bool(b) => Some(serde_json::Value::from(*b)),
        Data::DateTime(dt) => Some(serde_json::Value::from(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(serde_json::Value::String(s.clone()))
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Vec<ParsedSheet>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::Workbook(format!("neither xlsx nor JSON workbook: {e}")))?;

    let serde_json::Value::Object(map) = value else {
        return Err(Error::Workbook(
            "JSON workbook must be an object of sheet-name → row-array".to_string(),
        ));
    };

    let mut sheets = Vec::with_capacity(map.len());
    for (name, sheet_value) in map {
        let serde_json::Value::Array(raw_rows) = sheet_value else {
            warn!(sheet = %name, "Skipping JSON sheet that is not an array");
            continue;
        };

        let rows: Vec<SheetRow> = raw_rows
            .into_iter()
            .filter_map(|raw| match raw {
                serde_json::Value::Object(fields) => Some(SheetRow::from_map(fields)),
                _ => None,
            })
            .filter(|row| !row.is_empty())
            .collect();

        sheets.push(ParsedSheet { name, rows });
    }

    Ok(sheets)
}
