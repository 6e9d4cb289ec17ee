use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::files::{parse_upload, FileFormat};
use crate::job_controller::state::{JobUpdate, JobsState, StoredBatch};
use crate::processing::{prepare, process_with_progress};
use crate::services::files::upload::read_upload;
use crate::validation::ValidationClient;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::model::row::Dataset;
use common::responses::JobCreated;
use log::{error, info};
use std::time::Instant;

pub(crate) async fn process(
    payload: Multipart,
    jobs_state: web::Data<JobsState>,
    client: web::Data<ValidationClient>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match schedule_batch_job(payload, &jobs_state, &client, config.server.max_upload_bytes).await {
        Ok(job_id) => HttpResponse::Ok().json(JobCreated { job_id }),
        Err(e) => e.error_response(),
    }
}

/// Parses the upload and starts a job for it, returning the job id.
///
/// A byte-identical upload of a file whose earlier job finished without
/// upstream failures gets that job's id back and nothing is validated again.
async fn schedule_batch_job(
    payload: Multipart,
    jobs_state: &JobsState,
    client: &ValidationClient,
    max_bytes: usize,
) -> Result<String, ServiceError> {
    let upload = read_upload(payload, max_bytes).await?;
    if let Some(job_id) = jobs_state.reusable_job(&upload.md5, upload.format).await {
        info!(
            "{} (md5 {}) was already processed by job {}",
            upload.file_name, upload.md5, job_id
        );
        return Ok(job_id);
    }

    let dataset = parse_upload(&upload.file_name, &upload.bytes)?;
    // Reject empty files here rather than in a job nobody can report on.
    prepare(&dataset)?;

    let job_id = uuid::Uuid::new_v4().to_string();
    jobs_state.register(&job_id).await;
    info!(
        "Job {} created for {} ({} rows)",
        job_id,
        upload.file_name,
        dataset.rows.len()
    );

    tokio::spawn(run_batch_job(
        jobs_state.clone(),
        client.clone(),
        job_id.clone(),
        upload.file_name,
        upload.format,
        upload.md5,
        dataset,
    ));

    Ok(job_id)
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        100
    } else {
        (done * 100 / total) as u32
    }
}

/// Validates `dataset`, stores the batch under `job_id` and reports the
/// outcome through the job channel.
pub(crate) async fn run_batch_job(
    jobs_state: JobsState,
    client: ValidationClient,
    job_id: String,
    file_name: String,
    format: FileFormat,
    file_md5: String,
    dataset: Dataset,
) {
    let start = Instant::now();
    let tx = jobs_state.tx.clone();
    let _ = tx
        .send(JobUpdate::new(&job_id, JobStatus::InProgress(0)))
        .await;

    let progress_tx = tx.clone();
    let progress_id = job_id.clone();
    let outcome = process_with_progress(&dataset, &client, move |done, total| {
        // Progress is best effort; a full channel only delays the next report.
        let _ = progress_tx.try_send(JobUpdate::new(
            &progress_id,
            JobStatus::InProgress(percent(done, total)),
        ));
    })
    .await;

    let status = match outcome {
        Ok(batch) => {
            let message = batch
                .warning
                .clone()
                .unwrap_or_else(|| format!("Processed {} rows", batch.rows.len()));
            jobs_state
                .store_result(
                    &job_id,
                    StoredBatch {
                        file_name,
                        format,
                        file_md5,
                        batch,
                    },
                )
                .await;
            JobStatus::Completed(message)
        }
        Err(e) => {
            error!("Job {} failed: {}", job_id, e);
            JobStatus::Failed(e.to_string())
        }
    };

    let _ = tx.send(JobUpdate::new(&job_id, status)).await;
    info!("Job {} finished in: {:.2?}", job_id, start.elapsed());
}
