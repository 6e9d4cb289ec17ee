use crate::error::ServiceError;
use crate::history::HistoryState;
use crate::phone::normalize_str;
use crate::validation::ValidationClient;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::validation::ValidationResult;
use common::requests::ValidateNumberQuery;
use log::info;

pub(crate) async fn process(
    query: web::Query<ValidateNumberQuery>,
    client: web::Data<ValidationClient>,
    history: web::Data<HistoryState>,
) -> impl Responder {
    match validate_number(query.into_inner(), &client, &history).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.error_response(),
    }
}

async fn validate_number(
    query: ValidateNumberQuery,
    client: &ValidationClient,
    history: &HistoryState,
) -> Result<ValidationResult, ServiceError> {
    let raw = query
        .number
        .filter(|n| !n.trim().is_empty())
        .ok_or(ServiceError::MissingNumber)?;
    let number = normalize_str(raw.trim()).ok_or(ServiceError::InvalidNumber)?;

    info!("Validating number: {}", number);
    let result = client.try_validate(number.as_str()).await?;
    history.record(&result).await;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::history::HistoryState;
    use crate::services::validation::configure_routes;
    use crate::validation::testing::{client_for, StubLookup};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::Value;
    use std::sync::Arc;

    macro_rules! app {
        ($stub:expr, $history:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(client_for($stub)))
                    .app_data(web::Data::new($history))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn returns_result_for_formatted_number() {
        let stub = Arc::new(StubLookup::new().answer("+14155552671", true, "mobile"));
        let history = HistoryState::new();
        let app = app!(stub.clone(), history.clone());

        let req = test::TestRequest::get()
            .uri("/validate-number?number=%28415%29%20555-2671")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["valid"], true);
        assert_eq!(body["line_type"], "mobile");
        assert_eq!(body["number"], "+14155552671");
        assert_eq!(body["carrier"], "Test Carrier");
        assert_eq!(body["location"], "Unknown");
        assert_eq!(stub.calls(), vec!["+14155552671"]);
        assert_eq!(history.recent().await.len(), 1);
    }

    #[actix_web::test]
    async fn missing_number_is_a_bad_request() {
        let app = app!(Arc::new(StubLookup::new()), HistoryState::new());
        for uri in ["/validate-number", "/validate-number?number="] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Phone number is required");
        }
    }

    #[actix_web::test]
    async fn short_number_is_rejected_without_upstream_call() {
        let stub = Arc::new(StubLookup::new());
        let app = app!(stub.clone(), HistoryState::new());
        let req = test::TestRequest::get()
            .uri("/validate-number?number=555-1234")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid phone number format");
        assert!(stub.calls().is_empty());
    }

    #[actix_web::test]
    async fn upstream_failure_is_a_server_error() {
        let stub = Arc::new(StubLookup::new());
        let history = HistoryState::new();
        let app = app!(stub.clone(), history.clone());
        let req = test::TestRequest::get()
            .uri("/validate-number?number=4155552671")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Failed to validate number: API error: 503 Service Unavailable"
        );
        assert_eq!(stub.calls().len(), 3);
        assert!(history.recent().await.is_empty());
    }
}
