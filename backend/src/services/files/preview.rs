use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::files::parse_upload;
use crate::phone::detect_phone_columns;
use crate::services::files::upload::read_upload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::row::Dataset;
use common::responses::FilePreview;

const PREVIEW_ROWS: usize = 5;

pub(crate) async fn process(payload: Multipart, config: web::Data<AppConfig>) -> impl Responder {
    match preview_file(payload, config.server.max_upload_bytes).await {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => e.error_response(),
    }
}

async fn preview_file(payload: Multipart, max_bytes: usize) -> Result<FilePreview, ServiceError> {
    let upload = read_upload(payload, max_bytes).await?;
    let dataset = parse_upload(&upload.file_name, &upload.bytes)?;
    let phone_columns = detect_phone_columns(&dataset);

    let Dataset { headers, rows } = dataset;
    Ok(FilePreview {
        file_name: upload.file_name,
        headers,
        total_rows: rows.len(),
        rows: rows.into_iter().take(PREVIEW_ROWS).collect(),
        phone_columns,
    })
}
