use crate::model::row::RawRow;
use crate::model::validation::ValidationResult;
use serde::Serialize;

/// JSON body of every error response.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response of `POST /validate-numbers`.
#[derive(Serialize, Debug)]
pub struct BatchValidationResponse {
    pub success: bool,
    pub results: Vec<ValidationResult>,
}

/// Response of `POST /api/files/process`.
#[derive(Serialize, Debug)]
pub struct JobCreated {
    pub job_id: String,
}

/// Response of `POST /api/files/preview`.
#[derive(Serialize, Debug)]
pub struct FilePreview {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub total_rows: usize,
    pub phone_columns: Vec<String>,
}
