//! Bulk validation of uploaded spreadsheets.
//!
//! Uploads are multipart/form-data requests carrying a single `file` part
//! (`.csv` or `.xlsx`). The part is read into memory up to
//! `server.max_upload_bytes` and fingerprinted with MD5. Parsing happens in
//! the request so unsupported, corrupt or empty files are answered with a 400
//! before any work is scheduled; validation of the extracted numbers runs as
//! a background job tracked in `JobsState`.
//!
//! A job moves through `Pending`, `InProgress(percent)` and then `Completed`
//! or `Failed`. Finished jobs keep their processed batch for result and
//! download requests until `batch.retain_finished_jobs` newer jobs have
//! finished, after which their id answers 404.
//!
//! The provided routes are:
//! - `POST /api/files/preview`: parses the upload and returns the headers,
//!   the first rows and the columns that look like phone numbers. Nothing is
//!   validated.
//!
//! - `POST /api/files/process`: parses the upload, starts a background job
//!   and returns its `job_id` right away. Uploading the same bytes again, in
//!   the same format, returns the id of the earlier job as long as it is
//!   still kept and none of its numbers failed upstream.
//!
//! - `POST /api/files/process-rows`: validates rows parsed by the client,
//!   sent as JSON, and answers with the processed batch in the same request.
//!   No job is created.
//!
//! - `GET /api/files/status/{job_id}`: current `JobStatus` of a job.
//!
//! - `GET /api/files/result/{job_id}`: the processed batch of a finished job;
//!   409 while the job is still running or when it failed.
//!
//! - `GET /api/files/download/{job_id}`: the processed batch as an attachment
//!   named `processed_<stem>`, written as CSV or XLSX to match the upload.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod download;
mod get_result;
mod get_status;
mod preview;
mod process;
mod process_rows;
mod upload;

const API_PATH: &str = "/api/files";

/// Configures and returns the Actix scope for file routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/preview", post().to(preview::process))
        // Starts a background validation job for an uploaded file.
        .route("/process", post().to(process::process))
        .route("/process-rows", post().to(process_rows::process))
        .route("/status/{job_id}", get().to(get_status::process))
        .route("/result/{job_id}", get().to(get_result::process))
        .route("/download/{job_id}", get().to(download::process))
}
