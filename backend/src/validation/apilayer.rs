use crate::config::UpstreamConfig;
use crate::validation::{LookupResponse, NumberLookup, UpstreamError};
use async_trait::async_trait;
use log::{debug, error};
use std::time::Duration;

/// HTTP client for the apilayer number verification API.
pub struct ApiLayerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiLayerClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl NumberLookup for ApiLayerClient {
    async fn lookup(&self, number: &str) -> Result<LookupResponse, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .header("apikey", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("number", number)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "API error for {}: status={} body={}",
                number,
                status.as_u16(),
                body
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let body = response.text().await?;
        debug!("API response body for {}: {}", number, body);
        serde_json::from_str::<LookupResponse>(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::ServerHandle;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// What the fake upstream saw: `apikey` header, raw query string and the
    /// decoded `number` parameter.
    #[derive(Default)]
    struct Seen {
        requests: Mutex<Vec<(Option<String>, String, String)>>,
    }

    async fn fake_validate(
        req: HttpRequest,
        query: web::Query<HashMap<String, String>>,
        seen: web::Data<Seen>,
    ) -> HttpResponse {
        let number = query.get("number").cloned().unwrap_or_default();
        let key = req
            .headers()
            .get("apikey")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.requests
            .lock()
            .unwrap()
            .push((key, req.query_string().to_string(), number.clone()));

        match number.as_str() {
            "+14155552671" => HttpResponse::Ok().json(serde_json::json!({
                "valid": true,
                "international_format": "+14155552671",
                "carrier": "AT&T Mobility LLC",
                "line_type": "mobile"
            })),
            "+10000000000" => HttpResponse::Unauthorized().body("invalid key"),
            _ => HttpResponse::Ok()
                .content_type("application/json")
                .body("<html>maintenance</html>"),
        }
    }

    async fn start_upstream(seen: web::Data<Seen>) -> (ApiLayerClient, ServerHandle) {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(seen.clone())
                .route("/validate", web::get().to(fake_validate))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let client = ApiLayerClient::new(&UpstreamConfig {
            base_url: format!("http://{addr}/validate"),
            api_key: "secret".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        (client, handle)
    }

    #[actix_web::test]
    async fn sends_key_and_encoded_number() {
        let seen = web::Data::new(Seen::default());
        let (client, handle) = start_upstream(seen.clone()).await;

        let response = client.lookup("+14155552671").await.unwrap();
        handle.stop(true).await;

        assert!(response.valid);
        assert_eq!(response.line_type.as_deref(), Some("mobile"));
        assert_eq!(response.carrier.as_deref(), Some("AT&T Mobility LLC"));

        let requests = seen.requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![(
                Some("secret".to_string()),
                "number=%2B14155552671".to_string(),
                "+14155552671".to_string()
            )]
        );
    }

    #[actix_web::test]
    async fn error_status_becomes_status_error() {
        let seen = web::Data::new(Seen::default());
        let (client, handle) = start_upstream(seen).await;

        let err = client.lookup("+10000000000").await.unwrap_err();
        handle.stop(true).await;

        match err {
            UpstreamError::Status {
                status,
                reason,
                body,
            } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "Unauthorized");
                assert_eq!(body, "invalid key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[actix_web::test]
    async fn unreadable_body_becomes_decode_error() {
        let seen = web::Data::new(Seen::default());
        let (client, handle) = start_upstream(seen).await;

        let err = client.lookup("+19999999999").await.unwrap_err();
        handle.stop(true).await;

        assert!(matches!(err, UpstreamError::Decode(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn decodes_upstream_payload() {
        let body = r#"{
            "valid": true,
            "number": "14155552671",
            "local_format": "4155552671",
            "international_format": "+14155552671",
            "country_prefix": "+1",
            "country_code": "US",
            "country_name": "United States of America",
            "location": "Novato",
            "carrier": "AT&T Mobility LLC",
            "line_type": "mobile"
        }"#;
        let parsed: LookupResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.valid);
        assert_eq!(parsed.line_type.as_deref(), Some("mobile"));
        assert_eq!(parsed.international_format.as_deref(), Some("+14155552671"));
        assert_eq!(parsed.country_name.as_deref(), Some("United States of America"));
    }

    #[test]
    fn missing_valid_flag_reads_as_false() {
        let parsed: LookupResponse = serde_json::from_str(r#"{"line_type": null}"#).unwrap();
        assert!(!parsed.valid);
        assert_eq!(parsed.line_type, None);
    }

    #[test]
    fn builds_from_config() {
        let config = UpstreamConfig::default();
        assert!(ApiLayerClient::new(&config).is_ok());
    }
}
