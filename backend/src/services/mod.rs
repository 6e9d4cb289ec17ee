pub mod files;
pub mod history;
pub mod validation;

use crate::error::ServiceError;
use actix_web::web;

/// JSON extractor settings shared by every route: bodies up to `limit`
/// bytes, malformed bodies answered with the usual `{ "error" }` shape.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ServiceError::InvalidJson(err.to_string()).into())
}
