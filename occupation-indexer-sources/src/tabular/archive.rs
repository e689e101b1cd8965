//! Decoding of the bulk archives: zip container, spreadsheet inside it,
//! rows inside the spreadsheet.

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::errors::SourceError;
use occupation_indexer_shared::{TabularOccupationRow, TabularValue};

/// Upper bound of the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Decode an archive into its detailed occupation rows.
pub fn decode_archive(bytes: Vec<u8>) -> Result<Vec<TabularOccupationRow>, SourceError> {
    let (name, spreadsheet) = extract_spreadsheet(bytes)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(spreadsheet))
        .map_err(|e| SourceError::unavailable(format!("cannot open {}: {}", name, e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::unavailable(format!("{} has no worksheet", name)))?
        .map_err(|e| SourceError::unavailable(format!("cannot read {}: {}", name, e)))?;

    let rows = rows_from_range(&range);
    debug!(file = %name, rows = rows.len(), "Decoded spreadsheet");
    Ok(rows)
}

/// Capacity to reserve for an entry; the declared size is untrusted.
fn preallocation(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Read the first spreadsheet entry of a zip archive.
///
/// # Returns
///
/// * `Ok((name, bytes))` - Entry name and its uncompressed content
/// * `Err(SourceError::SourceUnavailable)` - Not a zip, or no spreadsheet in it
pub fn extract_spreadsheet(bytes: Vec<u8>) -> Result<(String, Vec<u8>), SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SourceError::unavailable(format!("invalid archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| SourceError::unavailable(format!("invalid archive entry: {}", e)))?;

        if !entry.is_file() || !is_spreadsheet(entry.name()) {
            continue;
        }

        let name = entry.name().to_string();
        let mut content = Vec::with_capacity(preallocation(entry.size()));
        entry
            .read_to_end(&mut content)
            .map_err(|e| SourceError::unavailable(format!("cannot extract {}: {}", name, e)))?;
        return Ok((name, content));
    }

    Err(SourceError::unavailable("archive contains no spreadsheet"))
}

fn is_spreadsheet(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Turn a worksheet into rows. The first row holds the column headers.
///
/// Rows without an occupation code (footnotes) and aggregate rows are dropped.
pub fn rows_from_range(range: &Range<Data>) -> Vec<TabularOccupationRow> {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| cell_value(c).to_text()).collect(),
        None => return Vec::new(),
    };

    rows.map(|record| {
        TabularOccupationRow::from_record(&headers, record.iter().map(cell_value))
    })
    .filter(|row| !row.occ_code.is_empty() && row.is_detailed())
    .collect()
}

fn cell_value(cell: &Data) -> TabularValue {
    match cell {
        Data::Int(i) => TabularValue::Number(*i as f64),
        Data::Float(f) => TabularValue::Number(*f),
        Data::String(s) => TabularValue::Text(s.clone()),
        Data::Empty | Data::Error(_) => TabularValue::Empty,
        other => TabularValue::Text(other.to_string()),
    }
}
