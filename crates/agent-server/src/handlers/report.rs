use actix_web::{web, HttpResponse, Responder};
use agent_orchestrator::run_report;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub report_period: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub run_id: String,
    pub answer: String,
}

/// Kick off a report run and wait for it to finish. The caller gets the
/// supervisor's final answer in the response body.
pub async fn handler(state: web::Data<AppState>, req: web::Json<ReportRequest>) -> impl Responder {
    let run_id = Uuid::new_v4().to_string();

    match run_report(&state.pipeline, &state.ledger, &run_id, &req.report_period).await {
        Ok(answer) => HttpResponse::Ok().json(ReportResponse { run_id, answer }),
        Err(error) => {
            log::error!("[{run_id}] report run failed: {error}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "run_id": run_id,
                "error": error.to_string()
            }))
        }
    }
}
