use crate::error::ServiceError;
use crate::validation::ValidationClient;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::validation::ValidationResult;
use common::responses::BatchValidationResponse;
use log::info;
use serde_json::Value;

const INVALID_ENTRY: &str = "Invalid number";

pub(crate) async fn process(
    body: web::Json<Value>,
    client: web::Data<ValidationClient>,
) -> impl Responder {
    match validate_numbers(&body, &client).await {
        Ok(results) => HttpResponse::Ok().json(BatchValidationResponse {
            success: true,
            results,
        }),
        Err(e) => e.error_response(),
    }
}

/// One entry of the `numbers` array: usable text, or the raw value of an
/// entry that cannot be sent upstream.
enum Entry {
    Number(String),
    Rejected(String),
}

fn parse_entries(body: &Value) -> Result<Vec<Entry>, ServiceError> {
    let numbers = body
        .get("numbers")
        .and_then(Value::as_array)
        .filter(|numbers| !numbers.is_empty())
        .ok_or(ServiceError::MissingNumberList)?;

    Ok(numbers
        .iter()
        .map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Entry::Number(s.trim().to_string()),
            Value::String(s) => Entry::Rejected(s.clone()),
            Value::Number(n) => Entry::Number(n.to_string()),
            Value::Null => Entry::Rejected(String::new()),
            other => Entry::Rejected(other.to_string()),
        })
        .collect())
}

async fn validate_numbers(
    body: &Value,
    client: &ValidationClient,
) -> Result<Vec<ValidationResult>, ServiceError> {
    let entries = parse_entries(body)?;
    let numbers: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry {
            Entry::Number(number) => Some(number.clone()),
            Entry::Rejected(_) => None,
        })
        .collect();

    info!("Validating {} numbers", numbers.len());
    let mut validated = client.validate_many(&numbers).await.into_iter();

    // Results keep the request order; rejected entries sit where they were sent.
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Number(number) => validated
                .next()
                .unwrap_or_else(|| ValidationResult::failure(number, INVALID_ENTRY)),
            Entry::Rejected(raw) => ValidationResult::failure(raw, INVALID_ENTRY),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use crate::services::json_config;
    use crate::services::validation::configure_routes;
    use crate::validation::testing::{client_for, StubLookup};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    macro_rules! app {
        ($stub:expr) => {
            test::init_service(
                App::new()
                    .app_data(json_config(1024 * 1024))
                    .app_data(web::Data::new(client_for($stub)))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn every_number_gets_a_result() {
        let stub = Arc::new(StubLookup::new().answer("+14155552671", true, "mobile"));
        let app = app!(stub.clone());
        let req = test::TestRequest::post()
            .uri("/validate-numbers")
            .set_json(json!({ "numbers": ["+14155552671", "+12125550000", null] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);

        let by_number = |n: &str| {
            results
                .iter()
                .find(|r| r["input_number"] == n)
                .cloned()
                .unwrap()
        };
        assert_eq!(by_number("+14155552671")["line_type"], "mobile");
        let failed = by_number("+12125550000");
        assert_eq!(failed["success"], false);
        assert_eq!(failed["line_type"], "invalid");
        assert!(failed["error"]
            .as_str()
            .unwrap()
            .starts_with("API connection failed"));
        assert_eq!(results[2]["input_number"], "");
        assert_eq!(results[2]["error"], "Invalid number");

        // The null entry never reaches the upstream.
        assert_eq!(stub.calls().len(), 1 + 3);
    }

    #[actix_web::test]
    async fn missing_or_empty_list_is_a_bad_request() {
        let app = app!(Arc::new(StubLookup::new()));
        for body in [json!({}), json!({ "numbers": [] }), json!({ "numbers": "4155552671" })] {
            let req = test::TestRequest::post()
                .uri("/validate-numbers")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Array of phone numbers is required");
        }
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app!(Arc::new(StubLookup::new()));
        let req = test::TestRequest::post()
            .uri("/validate-numbers")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ numbers: ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }
}
