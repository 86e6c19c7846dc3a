use std::io;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::handlers;
use crate::state::AppState;

pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/report", web::post().to(handlers::report::handler))
            .route("/history", web::get().to(handlers::history::handler))
            .route("/health", web::get().to(handlers::health::handler)),
    );
}

pub async fn run_server(state: AppState, port: u16) -> io::Result<()> {
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(api_config)
    })
    .bind(format!("0.0.0.0:{port}"))?
    .run()
    .await
}
