use calamine::{open_workbook_auto, Data, Reader};
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DataUnavailable, Result};
use crate::types::RawRow;

/// Shape of a source file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// `.xlsx`, `.xlsm`, `.xls` and `.ods` are workbooks; anything else is
    /// read as CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "ods") => SourceFormat::Workbook,
            _ => SourceFormat::Csv,
        }
    }
}

/// Read every row of a CSV with a header row into [`RawRow`]s.
///
/// Short rows are padded with blanks and extra cells without a header are
/// ignored, so a ragged form export still loads. Cells that are not UTF-8
/// are decoded as Latin-1 instead of failing the file.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|h| decode_cell(h).trim_start_matches('\u{feff}').to_string())
        .collect();
    debug!(columns = headers.len(), "Read CSV header");

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while csv_reader.read_byte_record(&mut record)? {
        rows.push(build_row(&headers, record.iter().map(decode_cell)));
    }
    Ok(rows)
}

fn decode_cell(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let text: String = bytes.iter().map(|&b| char::from(b)).collect();
            warn!(bytes = bytes.len(), "Cell is not UTF-8, decoded as Latin-1");
            text
        }
    }
}

/// Read the first worksheet of a workbook; its first row is the header.
pub fn read_workbook(path: &Path) -> std::result::Result<Vec<RawRow>, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };
    debug!(columns = headers.len(), "Read worksheet header");

    Ok(sheet_rows
        .map(|cells| build_row(&headers, cells.iter().map(cell_text)))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // 2015.0 renders as "2015"
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

fn build_row(headers: &[String], cells: impl Iterator<Item = String>) -> RawRow {
    let mut cells = cells;
    let mut row = RawRow::new();
    for header in headers {
        let value = cells.next().unwrap_or_default();
        if header.trim().is_empty() {
            continue;
        }
        row.insert(header.clone(), value);
    }
    row
}

/// Load the source spreadsheet. Any failure here means the whole dataset is
/// unavailable, as opposed to a single malformed cell.
pub fn load_rows(path: impl AsRef<Path>) -> std::result::Result<Vec<RawRow>, DataUnavailable> {
    let path = path.as_ref();
    let unavailable = |reason: String| DataUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let format = SourceFormat::from_path(path);
    let rows = match format {
        SourceFormat::Csv => {
            let file = std::fs::File::open(path).map_err(|e| unavailable(e.to_string()))?;
            read_rows(file).map_err(|e| unavailable(e.to_string()))?
        }
        SourceFormat::Workbook => read_workbook(path).map_err(unavailable)?,
    };
    info!(rows = rows.len(), path = %path.display(), ?format, "Loaded source rows");
    Ok(rows)
}
