use crate::phone::normalizer::{normalize, MIN_DIGITS};
use common::model::row::{CellValue, Dataset};

/// True when a strict majority of `values` normalize to a phone number.
///
/// An empty column is never a phone column.
pub fn is_phone_column<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut total = 0usize;
    let mut matches = 0usize;
    for value in values {
        total += 1;
        if normalize(value).is_some_and(|n| n.as_str().len() >= MIN_DIGITS) {
            matches += 1;
        }
    }
    total > 0 && matches * 2 > total
}

/// Runs the classifier over every column of `dataset`, keeping header order.
pub fn detect_phone_columns(dataset: &Dataset) -> Vec<String> {
    if dataset.is_empty() {
        return Vec::new();
    }
    dataset
        .headers
        .iter()
        .filter(|header| is_phone_column(dataset.column_values(header)))
        .cloned()
        .collect()
}
