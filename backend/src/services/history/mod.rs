//! `GET /api/history`: the most recent valid single-number lookups, newest
//! first.

use crate::history::HistoryState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/history";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(history: web::Data<HistoryState>) -> impl Responder {
    HttpResponse::Ok().json(history.recent().await)
}
