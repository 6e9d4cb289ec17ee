use crate::error::ServiceError;
use crate::job_controller::state::{JobsState, StoredBatch};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match finished_batch(&state, &job_id.into_inner()).await {
        Ok(stored) => HttpResponse::Ok().json(stored.batch),
        Err(e) => e.error_response(),
    }
}

/// The stored batch of a finished job.
///
/// Jobs that are still running answer `ResultNotReady`, failed jobs
/// `JobFailed`, unknown ids `JobNotFound`.
pub(crate) async fn finished_batch(
    state: &JobsState,
    job_id: &str,
) -> Result<StoredBatch, ServiceError> {
    if let Some(stored) = state.result(job_id).await {
        return Ok(stored);
    }
    match state.status(job_id).await {
        Some(JobStatus::Failed(reason)) => Err(ServiceError::JobFailed(reason)),
        Some(_) => Err(ServiceError::ResultNotReady),
        None => Err(ServiceError::JobNotFound),
    }
}
