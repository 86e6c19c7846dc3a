//! API-level tests against an in-process actix app with a scripted
//! completion client behind the pipeline.

use std::sync::Arc;

use actix_web::{test, web, App};
use agent_core::ToolCall;
use agent_journal::MemoryJournal;
use agent_llm::{CompletionReply, ScriptedClient};
use agent_loop::RunnerContext;
use agent_orchestrator::ReportPipeline;
use agent_server::{api_config, AppState};
use serde_json::json;

const DEPLOYMENT: &str = "gpt-4o";

fn scripted_state(client: Arc<ScriptedClient>) -> AppState {
    let ctx = RunnerContext::new(client, Arc::new(MemoryJournal::new()));
    AppState::new(ReportPipeline::new(ctx, DEPLOYMENT))
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let state = scripted_state(Arc::new(ScriptedClient::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn report_run_answers_and_feeds_the_history_endpoint() {
    let client = Arc::new(ScriptedClient::new());
    client.push(
        DEPLOYMENT,
        CompletionReply::tool_calls(vec![ToolCall {
            id: "call_1".to_string(),
            name: "writer_agent".to_string(),
            arguments: json!({ "report_period": "January 2025" }),
        }]),
    );
    client.push(DEPLOYMENT, CompletionReply::text("Draft"));
    client.push(DEPLOYMENT, CompletionReply::text("Published the report."));

    let state = scripted_state(client);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/report")
        .set_json(json!({ "report_period": "January 2025" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["answer"], "Published the report.");
    assert!(body["run_id"].as_str().is_some());

    let req = test::TestRequest::get().uri("/api/v1/history").to_request();
    let history: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let value = history["value"].as_array().unwrap();
    assert_eq!(value.len(), 2);
    assert_eq!(value[0]["role"], "User");
    assert_eq!(value[0]["messageEntryType"], "Content");
    assert_eq!(value[0]["iteration"], 0);
    assert_eq!(
        value[0]["messageEntryPayload"]["content"],
        "the requested report period is January 2025"
    );
    assert_eq!(value[1]["role"], "Assistant");
    assert_eq!(value[1]["messageEntryPayload"]["content"], "Published the report.");
}

#[actix_web::test]
async fn failed_run_surfaces_a_server_error() {
    // Empty script: the supervisor's first completion call fails.
    let state = scripted_state(Arc::new(ScriptedClient::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/report")
        .set_json(json!({ "report_period": "January 2025" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 500);
}
