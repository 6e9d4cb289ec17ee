//! Calls out to the third-party phone validation API.
//!
//! The upstream is reached through the `NumberLookup` trait, one raw HTTP
//! call per number. `ValidationClient` wraps a lookup with the retry policy
//! and turns upstream answers into `ValidationResult`s:
//!
//! - `try_validate`: one number, upstream failure returned as an error.
//! - `validate_one`: one number, upstream failure folded into a failure result.
//! - `validate_many`: many numbers, every one attempted, one result each.

pub mod apilayer;
pub mod retry;

use crate::validation::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use common::model::validation::{LineType, ValidationResult};
use futures_util::stream::{self, StreamExt};
use log::error;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub use apilayer::ApiLayerClient;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("API error: {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// A body that failed to decode will not decode on a second try.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, UpstreamError::Decode(_))
    }
}

/// Payload returned by the upstream validation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub valid: bool,
    pub line_type: Option<String>,
    pub international_format: Option<String>,
    pub carrier: Option<String>,
    pub location: Option<String>,
    pub country_name: Option<String>,
}

/// A single, unretried call to the upstream validation service.
#[async_trait]
pub trait NumberLookup: Send + Sync {
    async fn lookup(&self, number: &str) -> Result<LookupResponse, UpstreamError>;
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds a successful result, filling defaults for absent upstream fields.
fn result_from_lookup(number: &str, response: LookupResponse) -> ValidationResult {
    let line_type = LineType::from_upstream(response.line_type.as_deref());
    let or_unknown = |v: Option<String>| Some(present(v).unwrap_or_else(|| UNKNOWN.to_string()));
    ValidationResult {
        input_number: number.to_string(),
        success: true,
        valid: response.valid,
        line_type,
        canonical_number: Some(
            present(response.international_format).unwrap_or_else(|| number.to_string()),
        ),
        carrier: or_unknown(response.carrier),
        location: or_unknown(response.location),
        country: or_unknown(response.country_name),
        error_message: None,
    }
}

#[derive(Clone)]
pub struct ValidationClient {
    lookup: Arc<dyn NumberLookup>,
    policy: RetryPolicy,
    concurrency: usize,
}

impl ValidationClient {
    pub fn new(lookup: Arc<dyn NumberLookup>, policy: RetryPolicy) -> Self {
        Self {
            lookup,
            policy,
            concurrency: 1,
        }
    }

    /// Caps how many numbers of one batch are in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn try_validate(&self, number: &str) -> Result<ValidationResult, UpstreamError> {
        let label = format!("validation of {number}");
        let response = with_retry(&self.policy, &label, UpstreamError::is_retryable, |_| {
            self.lookup.lookup(number)
        })
        .await?;
        log::debug!("API response for {}: {:?}", number, response);
        Ok(result_from_lookup(number, response))
    }

    pub async fn validate_one(&self, number: &str) -> ValidationResult {
        match self.try_validate(number).await {
            Ok(result) => result,
            Err(err) => {
                error!("Server error for {}: {}", number, err);
                if let UpstreamError::Status { body, .. } = &err {
                    log::debug!("Upstream error body for {}: {}", number, body);
                }
                ValidationResult::failure(number, format!("API connection failed: {err}"))
            }
        }
    }

    /// Validates every number, one result per input.
    ///
    /// A failing number never stops its siblings; the call returns once all
    /// numbers have succeeded or used up their retries. Results come back in
    /// input order, but callers correlate by number, not position.
    pub async fn validate_many(&self, numbers: &[String]) -> Vec<ValidationResult> {
        stream::iter(numbers.iter().cloned())
            .map(|number| async move { self.validate_one(&number).await })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
