use calamine::{Data, Reader, Xlsx};
use common::model::row::{CellValue, Dataset, RawRow};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported file type '{0}': upload a .csv or .xlsx file")]
    Unsupported(String),
    #[error("Could not read CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not read XLSX file: {0}")]
    Xlsx(String),
    #[error("The file has no header row")]
    NoHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, ParseError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") => Ok(FileFormat::Xlsx),
            _ => Err(ParseError::Unsupported(file_name.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv; charset=utf-8",
            FileFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// Parses an uploaded file, picking the format from its extension.
///
/// The first row holds the column names. A file with a header and no data
/// rows parses into an empty dataset; rejecting it is up to the caller.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Dataset, ParseError> {
    match FileFormat::from_file_name(file_name)? {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Xlsx => parse_xlsx(bytes),
    }
}

fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches('\u{FEFF}')
        .replace('\u{00A0}', " ")
        .trim()
        .to_string()
}

pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record.get(idx).map(CellValue::from_text).unwrap_or_default();
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::from_text(&other.to_string()),
    }
}

pub fn parse_xlsx(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ParseError::Xlsx(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::Xlsx("the workbook has no sheets".to_string()))?
        .map_err(|e| ParseError::Xlsx(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or(ParseError::NoHeader)?
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeader);
    }

    let rows = sheet_rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = cells.get(idx).map(cell_value).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect::<RawRow>()
        })
        .collect();

    Ok(Dataset::new(headers, rows))
}
