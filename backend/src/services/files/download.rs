use crate::error::ServiceError;
use crate::files::{export_batch, export_file_name, FileFormat};
use crate::job_controller::state::JobsState;
use crate::services::files::get_result::finished_batch;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::info;

/// An exported batch ready to be sent as an attachment.
struct Export {
    file_name: String,
    format: FileFormat,
    bytes: Vec<u8>,
}

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match download(&state, &job_id.into_inner()).await {
        Ok(export) => HttpResponse::Ok()
            .content_type(export.format.content_type())
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(export.file_name)],
            })
            .body(export.bytes),
        Err(e) => e.error_response(),
    }
}

async fn download(state: &JobsState, job_id: &str) -> Result<Export, ServiceError> {
    let stored = finished_batch(state, job_id).await?;
    let bytes = export_batch(&stored.batch, stored.format)?;
    info!(
        "Exporting job {} as {} ({} bytes)",
        job_id,
        stored.format.extension(),
        bytes.len()
    );
    Ok(Export {
        file_name: export_file_name(&stored.file_name, stored.format),
        format: stored.format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use crate::files::parser::parse_xlsx;
    use crate::services::files::configure_routes;
    use crate::services::files::testing::{finished_job, jobs_state};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use common::model::batch::{AnnotatedRow, BatchStatistics, ProcessedBatch};
    use common::model::row::{CellValue, RawRow};

    #[actix_web::test]
    async fn serves_csv_attachment() {
        let row: RawRow = [("Phone", CellValue::from("415-555-2671"))]
            .into_iter()
            .collect();
        let rows = vec![AnnotatedRow::not_found(row)];
        let batch = ProcessedBatch {
            headers: vec!["Phone".to_string()],
            phone_columns: vec!["Phone".to_string()],
            statistics: BatchStatistics::from_rows(&rows),
            rows,
            failed_validations: 0,
            warning: None,
        };
        let state = jobs_state();
        finished_job(&state, "job-1", "contacts.csv", batch).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/files/download/job-1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("processed_contacts.csv"));

        let body = test::read_body(resp).await;
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "Phone,Valid Mobile Number,Line Type,Error\n415-555-2671,Not Found,Invalid,\n"
        );
    }

    #[actix_web::test]
    async fn xlsx_upload_downloads_as_xlsx() {
        let row: RawRow = [("Phone", CellValue::Number(4155552671.0))]
            .into_iter()
            .collect();
        let rows = vec![AnnotatedRow {
            row,
            valid_mobile_number: "+14155552671".to_string(),
            line_type: "Mobile".to_string(),
            error: None,
        }];
        let batch = ProcessedBatch {
            headers: vec!["Phone".to_string()],
            phone_columns: vec!["Phone".to_string()],
            statistics: BatchStatistics::from_rows(&rows),
            rows,
            failed_validations: 0,
            warning: None,
        };
        let state = jobs_state();
        finished_job(&state, "job-x", "leads.xlsx", batch).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/files/download/job-x").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("processed_leads.xlsx"));

        let body = test::read_body(resp).await;
        let dataset = parse_xlsx(&body).unwrap();
        assert_eq!(
            dataset.headers,
            vec!["Phone", "Valid Mobile Number", "Line Type", "Error"]
        );
        assert_eq!(
            dataset.rows[0].get("Valid Mobile Number"),
            Some(&CellValue::from("+14155552671"))
        );
    }

    #[actix_web::test]
    async fn unknown_job_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jobs_state()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/files/download/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
