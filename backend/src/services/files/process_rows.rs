use crate::error::ServiceError;
use crate::processing;
use crate::validation::ValidationClient;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::batch::ProcessedBatch;
use common::model::row::Dataset;
use common::requests::ProcessRowsRequest;

pub(crate) async fn process(
    req: web::Json<ProcessRowsRequest>,
    client: web::Data<ValidationClient>,
) -> impl Responder {
    match process_rows(req.into_inner(), &client).await {
        Ok(batch) => HttpResponse::Ok().json(batch),
        Err(e) => e.error_response(),
    }
}

async fn process_rows(
    req: ProcessRowsRequest,
    client: &ValidationClient,
) -> Result<ProcessedBatch, ServiceError> {
    let dataset = Dataset::from_rows(req.rows);
    Ok(processing::process(&dataset, client).await?)
}
