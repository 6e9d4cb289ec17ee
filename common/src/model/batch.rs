use crate::model::row::{CellValue, RawRow};
use crate::model::validation::LineType;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const VALID_MOBILE_COLUMN: &str = "Valid Mobile Number";
pub const LINE_TYPE_COLUMN: &str = "Line Type";
pub const ERROR_COLUMN: &str = "Error";
pub const NOT_FOUND: &str = "Not Found";

/// The three columns appended to every exported row, in export order.
pub const ANNOTATION_COLUMNS: [&str; 3] = [VALID_MOBILE_COLUMN, LINE_TYPE_COLUMN, ERROR_COLUMN];

/// A source row plus the outcome of validating its phone columns.
///
/// Serializes flat: the original columns first, then the three annotation
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    pub row: RawRow,
    /// The resolved mobile number, or `Not Found`.
    pub valid_mobile_number: String,
    /// Human-readable line type ("Mobile", "Landline", "Invalid", "Unknown").
    pub line_type: String,
    pub error: Option<String>,
}

impl AnnotatedRow {
    /// The row outcome when no candidate column matched a result.
    pub fn not_found(row: RawRow) -> Self {
        Self {
            row,
            valid_mobile_number: NOT_FOUND.to_string(),
            line_type: LineType::Invalid.display_name().to_string(),
            error: None,
        }
    }

    /// Cell text for one output column, annotation columns included.
    pub fn cell_text(&self, column: &str) -> String {
        match column {
            VALID_MOBILE_COLUMN => self.valid_mobile_number.clone(),
            LINE_TYPE_COLUMN => self.line_type.clone(),
            ERROR_COLUMN => self.error.clone().unwrap_or_default(),
            other => self.row.get(other).map(CellValue::to_text).unwrap_or_default(),
        }
    }
}

impl Serialize for AnnotatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.row.len() + 3))?;
        for (name, value) in self.row.iter() {
            if ANNOTATION_COLUMNS.contains(&name) {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(VALID_MOBILE_COLUMN, &self.valid_mobile_number)?;
        map.serialize_entry(LINE_TYPE_COLUMN, &self.line_type)?;
        map.serialize_entry(ERROR_COLUMN, &self.error)?;
        map.end()
    }
}

/// Row counts per final line type for one processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub mobile: usize,
    pub landline: usize,
    pub invalid: usize,
}

impl BatchStatistics {
    pub fn from_rows(rows: &[AnnotatedRow]) -> Self {
        let count = |line_type: LineType| {
            rows.iter()
                .filter(|row| row.line_type == line_type.display_name())
                .count()
        };
        Self {
            total: rows.len(),
            mobile: count(LineType::Mobile),
            landline: count(LineType::Landline),
            invalid: count(LineType::Invalid),
        }
    }
}

/// Everything produced by one bulk run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedBatch {
    pub headers: Vec<String>,
    /// Detected phone columns in the order they were scanned.
    pub phone_columns: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
    pub statistics: BatchStatistics,
    /// How many distinct numbers could not be validated upstream.
    pub failed_validations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
