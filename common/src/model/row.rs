use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single spreadsheet cell as it came out of the parser.
///
/// CSV uploads only ever produce `Text` and `Empty`; spreadsheet uploads and
/// JSON rows may also carry numbers and booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    #[default]
    Empty,
}

impl CellValue {
    /// Builds a cell from raw text, mapping blank strings to `Empty`.
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used for display and CSV export. Integral numbers drop the
    /// fractional part so `4155552671.0` reads back as `4155552671`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e16 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One parsed spreadsheet row: column name to cell value.
///
/// Columns keep the order in which the source presented them. Lookups of a
/// column the row does not carry return `None`; callers treat that the same
/// as an empty cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value, replacing an earlier value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (K, CellValue)>>(iter: T) -> Self {
        let mut row = RawRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RawRowVisitor;

impl<'de> Visitor<'de> for RawRowVisitor {
    type Value = RawRow;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping column names to cell values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
        let mut row = RawRow::new();
        while let Some((name, value)) = access.next_entry::<String, CellValue>()? {
            row.insert(name, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawRowVisitor)
    }
}

/// A parsed upload: header names in file order plus the data rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    /// Builds a dataset from rows alone. Headers are the columns of the first
    /// row, in order.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let headers = rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self { headers, rows }
    }

    /// All values of one column, with missing cells read as `Empty`.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&EMPTY))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_row_keeps_document_order() {
        let row: RawRow =
            serde_json::from_str(r#"{"zeta": "1", "alpha": 2, "mid": null}"#).unwrap();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);
        assert_eq!(row.get("alpha"), Some(&CellValue::Number(2.0)));
        assert_eq!(row.get("mid"), Some(&CellValue::Empty));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":2.0,"mid":null}"#);
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(4155552671.0).to_text(), "4155552671");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn dataset_from_rows_takes_first_row_columns() {
        let first: RawRow = [("Name", CellValue::from("Ann")), ("Phone", CellValue::from("1"))]
            .into_iter()
            .collect();
        let second: RawRow = [("Phone", CellValue::from("2"))].into_iter().collect();
        let dataset = Dataset::from_rows(vec![first, second]);
        assert_eq!(dataset.headers, vec!["Name", "Phone"]);

        let names: Vec<&CellValue> = dataset.column_values("Name").collect();
        assert_eq!(names, vec![&CellValue::from("Ann"), &CellValue::Empty]);
    }
}
