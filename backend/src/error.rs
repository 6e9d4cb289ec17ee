use crate::files::{ExportError, ParseError};
use crate::processing::ProcessError;
use crate::validation::UpstreamError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::responses::ErrorResponse;
use thiserror::Error;

/// Errors surfaced to HTTP clients as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Phone number is required")]
    MissingNumber,
    #[error("Invalid phone number format")]
    InvalidNumber,
    #[error("Array of phone numbers is required")]
    MissingNumberList,
    #[error("Missing file")]
    MissingFile,
    #[error("File exceeds the {0} byte upload limit")]
    FileTooLarge(usize),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("Failed to validate number: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("Job ID not found")]
    JobNotFound,
    #[error("Job has not finished yet")]
    ResultNotReady,
    #[error("Job failed: {0}")]
    JobFailed(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingNumber
            | ServiceError::InvalidNumber
            | ServiceError::MissingNumberList
            | ServiceError::MissingFile
            | ServiceError::Upload(_)
            | ServiceError::InvalidJson(_)
            | ServiceError::Parse(_)
            | ServiceError::Process(_) => StatusCode::BAD_REQUEST,
            ServiceError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::JobNotFound => StatusCode::NOT_FOUND,
            ServiceError::ResultNotReady | ServiceError::JobFailed(_) => StatusCode::CONFLICT,
            ServiceError::Upstream(_) | ServiceError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
