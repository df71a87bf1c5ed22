use csv::Writer;
use rust_xlsxwriter::Workbook;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::constants::EXPORT_COLUMNS;
use crate::error::{DashboardError, Result};
use crate::ingest::SourceFormat;
use crate::observability::metrics;
use crate::query::contactable;
use crate::types::AlumniRecord;

/// Write the download file: every consenting record, whatever filters the
/// table currently shows. Returns the number of data rows written.
pub fn write_export<W: Write>(records: &[AlumniRecord], writer: W) -> Result<usize> {
    let rows = contactable(records);
    let mut csv_writer = Writer::from_writer(writer);

    csv_writer.write_record(EXPORT_COLUMNS)?;
    for record in &rows {
        let year = record
            .graduation_year
            .map(|y| y.to_string())
            .unwrap_or_default();
        csv_writer.write_record([
            record.full_name().as_str(),
            record.email.as_str(),
            year.as_str(),
            record.company.as_str(),
            record.position.as_str(),
            record.industry.as_str(),
            record.current_location.as_str(),
        ])?;
    }
    csv_writer.flush()?;

    metrics::export::rows_exported(rows.len());
    Ok(rows.len())
}

pub fn export_to_bytes(records: &[AlumniRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_export(records, &mut buffer)?;
    Ok(buffer)
}

/// Same rows and columns as [`write_export`], as a single-sheet `.xlsx`.
/// Graduation years are numeric cells.
pub fn export_to_xlsx_bytes(records: &[AlumniRecord]) -> Result<Vec<u8>> {
    let rows = contactable(records);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, label) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *label)?;
    }
    for (i, record) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        let name = record.full_name();
        sheet.write_string(row, 0, name.as_str())?;
        sheet.write_string(row, 1, record.email.as_str())?;
        if let Some(year) = record.graduation_year {
            sheet.write_number(row, 2, f64::from(year))?;
        }
        sheet.write_string(row, 3, record.company.as_str())?;
        sheet.write_string(row, 4, record.position.as_str())?;
        sheet.write_string(row, 5, record.industry.as_str())?;
        sheet.write_string(row, 6, record.current_location.as_str())?;
    }

    let buffer = workbook.save_to_buffer()?;
    metrics::export::rows_exported(rows.len());
    Ok(buffer)
}

/// Write the export to `path`, as a workbook when the extension says so and
/// as CSV otherwise.
pub fn export_to_file(records: &[AlumniRecord], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let written = match SourceFormat::from_path(path) {
        SourceFormat::Workbook => {
            std::fs::write(path, export_to_xlsx_bytes(records)?)?;
            contactable(records).len()
        }
        SourceFormat::Csv => write_export(records, std::fs::File::create(path)?)?,
    };
    info!(rows = written, path = %path.display(), "Export written");
    Ok(written)
}

/// Fail when `output` names the same file as `source`. The export drops
/// columns and non-consenting rows, so writing over the source loses data.
pub fn ensure_not_source(output: &Path, source: &Path) -> Result<()> {
    let same = match (std::fs::canonicalize(output), std::fs::canonicalize(source)) {
        (Ok(output), Ok(source)) => output == source,
        _ => output == source,
    };
    if same {
        return Err(DashboardError::OverwritesSource {
            path: output.display().to_string(),
        });
    }
    Ok(())
}
