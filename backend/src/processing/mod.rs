//! Bulk processing of an uploaded dataset.
//!
//! `prepare` detects the phone columns and collects the distinct numbers to
//! validate; `process` validates them and merges the results back onto the
//! rows. A row is decided by the first candidate column (in detection order)
//! whose value normalizes and has a result; later columns are ignored.

use crate::phone::{detect_phone_columns, normalize};
use crate::validation::ValidationClient;
use common::model::batch::{AnnotatedRow, BatchStatistics, ProcessedBatch, NOT_FOUND};
use common::model::phone::NormalizedNumber;
use common::model::row::Dataset;
use common::model::validation::{LineType, ValidationResult};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Numbers validated between two progress reports.
const PROGRESS_CHUNK: usize = 25;

const DEFAULT_VALIDATION_ERROR: &str = "Validation failed";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Invalid file format or empty file.")]
    EmptyDataset,
}

/// Classifier output for one dataset: candidate columns plus the distinct
/// numbers found in them, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub phone_columns: Vec<String>,
    pub numbers: Vec<NormalizedNumber>,
}

pub fn prepare(dataset: &Dataset) -> Result<PreparedBatch, ProcessError> {
    if dataset.is_empty() {
        return Err(ProcessError::EmptyDataset);
    }

    let phone_columns = detect_phone_columns(dataset);
    info!("Potential phone columns: {:?}", phone_columns);

    let mut seen = HashSet::new();
    let mut numbers = Vec::new();
    for row in &dataset.rows {
        for column in &phone_columns {
            if let Some(number) = row.get(column).and_then(normalize) {
                if seen.insert(number.clone()) {
                    numbers.push(number);
                }
            }
        }
    }

    Ok(PreparedBatch {
        phone_columns,
        numbers,
    })
}

pub async fn process(
    dataset: &Dataset,
    client: &ValidationClient,
) -> Result<ProcessedBatch, ProcessError> {
    process_with_progress(dataset, client, |_, _| {}).await
}

/// Like `process`, calling `on_progress(validated, total)` as numbers are
/// validated.
pub async fn process_with_progress<F>(
    dataset: &Dataset,
    client: &ValidationClient,
    mut on_progress: F,
) -> Result<ProcessedBatch, ProcessError>
where
    F: FnMut(usize, usize) + Send,
{
    let prepared = prepare(dataset)?;
    let numbers: Vec<String> = prepared
        .numbers
        .iter()
        .map(|n| n.as_str().to_string())
        .collect();

    let mut results = Vec::with_capacity(numbers.len());
    for chunk in numbers.chunks(PROGRESS_CHUNK) {
        results.extend(client.validate_many(chunk).await);
        on_progress(results.len(), numbers.len());
    }

    Ok(merge(dataset, &prepared, &results))
}

/// Merges validation results onto the rows and computes the statistics.
pub fn merge(
    dataset: &Dataset,
    prepared: &PreparedBatch,
    results: &[ValidationResult],
) -> ProcessedBatch {
    let mut by_number: HashMap<&str, &ValidationResult> = HashMap::new();
    for result in results {
        by_number.entry(result.correlation_key()).or_insert(result);
    }

    let rows: Vec<AnnotatedRow> = dataset
        .rows
        .iter()
        .map(|row| {
            let matched = prepared.phone_columns.iter().find_map(|column| {
                let number = row.get(column).and_then(normalize)?;
                let result = by_number.get(number.as_str())?;
                Some((number, *result))
            });

            match matched {
                Some((number, result)) if result.valid => AnnotatedRow {
                    row: row.clone(),
                    valid_mobile_number: if result.line_type == LineType::Mobile {
                        number.into_string()
                    } else {
                        NOT_FOUND.to_string()
                    },
                    line_type: result.line_type.display_name().to_string(),
                    error: None,
                },
                Some((_, result)) => AnnotatedRow {
                    error: Some(
                        result
                            .error_message
                            .clone()
                            .unwrap_or_else(|| DEFAULT_VALIDATION_ERROR.to_string()),
                    ),
                    ..AnnotatedRow::not_found(row.clone())
                },
                None => AnnotatedRow::not_found(row.clone()),
            }
        })
        .collect();

    let statistics = BatchStatistics::from_rows(&rows);
    let failed_validations = results.iter().filter(|r| !r.success).count();
    let warning = if prepared.phone_columns.is_empty() {
        Some("No phone number columns were detected".to_string())
    } else if failed_validations > 0 {
        Some(format!(
            "{} of {} numbers could not be validated; affected rows carry the error in the Error column",
            failed_validations,
            results.len()
        ))
    } else {
        None
    };
    if let Some(message) = &warning {
        warn!("{}", message);
    }

    ProcessedBatch {
        headers: dataset.headers.clone(),
        phone_columns: prepared.phone_columns.clone(),
        rows,
        statistics,
        failed_validations,
        warning,
    }
}
