//! Phone number validation endpoints.
//!
//! - `GET /validate-number?number=...`: validates one number. The number is
//!   normalized first; a missing or unparseable number is a 400, an upstream
//!   failure after retries a 500. Valid results are added to the recent
//!   history.
//! - `POST /validate-numbers`: validates a list of numbers. Every number gets
//!   a result, failed ones included; only a missing or empty list is an error.

use actix_web::web;

mod validate_number;
mod validate_numbers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/validate-number", web::get().to(validate_number::process))
        .route("/validate-numbers", web::post().to(validate_numbers::process));
}
