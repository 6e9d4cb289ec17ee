use crate::files::parser::FileFormat;
use common::model::batch::{AnnotatedRow, ProcessedBatch, ANNOTATION_COLUMNS};
use common::model::row::CellValue;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write XLSX: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("too many columns for an XLSX sheet: {0}")]
    TooManyColumns(usize),
}

/// Output columns: the original ones followed by "Valid Mobile Number",
/// "Line Type" and "Error".
fn output_columns(batch: &ProcessedBatch) -> Vec<&str> {
    batch
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !ANNOTATION_COLUMNS.contains(h))
        .chain(ANNOTATION_COLUMNS)
        .collect()
}

/// Writes the batch in the format it was uploaded in.
pub fn export_batch(batch: &ProcessedBatch, format: FileFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        FileFormat::Csv => export_csv(batch),
        FileFormat::Xlsx => export_xlsx(batch),
    }
}

pub fn export_csv(batch: &ProcessedBatch) -> Result<Vec<u8>, ExportError> {
    let columns = output_columns(batch);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in &batch.rows {
        writer.write_record(columns.iter().map(|column| row.cell_text(column)))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

fn write_cell(
    sheet: &mut Worksheet,
    line: u32,
    col: u16,
    row: &AnnotatedRow,
    column: &str,
) -> Result<(), XlsxError> {
    // Original cells keep their type; derived columns are text.
    let value = if ANNOTATION_COLUMNS.contains(&column) {
        CellValue::from_text(&row.cell_text(column))
    } else {
        row.row.get(column).cloned().unwrap_or_default()
    };
    match value {
        CellValue::Text(text) => sheet.write_string(line, col, text).map(|_| ()),
        CellValue::Number(n) => sheet.write_number(line, col, n).map(|_| ()),
        CellValue::Bool(b) => sheet.write_boolean(line, col, b).map(|_| ()),
        CellValue::Empty => Ok(()),
    }
}

/// Writes a single-sheet workbook: header row, then one line per row.
pub fn export_xlsx(batch: &ProcessedBatch) -> Result<Vec<u8>, ExportError> {
    let columns = output_columns(batch);
    if columns.len() > usize::from(u16::MAX) {
        return Err(ExportError::TooManyColumns(columns.len()));
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, column) in (0u16..).zip(&columns) {
            sheet.write_string(0, col, *column)?;
        }
        for (line, row) in (1u32..).zip(&batch.rows) {
            for (col, column) in (0u16..).zip(&columns) {
                write_cell(sheet, line, col, row, column)?;
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Download name for a processed upload: `processed_<stem>.<ext>`, with the
/// extension of `format`.
pub fn export_file_name(original: &str, format: FileFormat) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("processed_{stem}.{}", format.extension())
}
