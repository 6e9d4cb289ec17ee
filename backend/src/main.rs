mod config;
mod error;
mod files;
mod history;
mod job_controller;
mod phone;
mod processing;
mod services;
mod validation;

use crate::config::load_config;
use crate::history::HistoryState;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::validation::{ApiLayerClient, ValidationClient};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;

const JOB_CHANNEL_BUFFER: usize = 100;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = load_config().map_err(io::Error::other)?;
    let lookup = ApiLayerClient::new(&config.upstream).map_err(io::Error::other)?;
    let client = ValidationClient::new(Arc::new(lookup), config.retry.policy())
        .with_concurrency(config.batch.concurrency);

    // Initialize job controller state
    let (jobs_state, rx) =
        JobsState::new(JOB_CHANNEL_BUFFER, config.batch.retain_finished_jobs);
    tokio::spawn(start_job_updater(jobs_state.clone(), rx));

    let history = HistoryState::new();
    let host = config.server.host.clone();
    let port = config.server.port;
    let json_limit = config.server.max_upload_bytes;

    let jobs_state = web::Data::new(jobs_state);
    let client = web::Data::new(client);
    let history = web::Data::new(history);
    let config = web::Data::new(config);

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(services::json_config(json_limit))
            .app_data(jobs_state.clone())
            .app_data(client.clone())
            .app_data(history.clone())
            .app_data(config.clone())
            .configure(services::validation::configure_routes)
            .service(services::history::configure_routes())
            .service(services::files::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
