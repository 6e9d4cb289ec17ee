use crate::error::ServiceError;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => ServiceError::JobNotFound.error_response(),
    }
}
