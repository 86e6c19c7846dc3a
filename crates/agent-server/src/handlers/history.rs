use actix_web::{web, HttpResponse, Responder};
use chat_history::{EntryType, HistoryRecord, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatMessageSummary {
    #[serde(rename = "messageEntryType")]
    pub message_entry_type: &'static str,
    pub role: &'static str,
    pub timestamp: DateTime<Utc>,
    pub iteration: u64,
    #[serde(rename = "messageEntryPayload")]
    pub message_entry_payload: ChatMessagePayload,
}

#[derive(Debug, Serialize)]
pub struct ChatMessagePayload {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub value: Vec<ChatMessageSummary>,
}

fn summarize(record: HistoryRecord) -> ChatMessageSummary {
    ChatMessageSummary {
        message_entry_type: match record.entry_type {
            EntryType::Content => "Content",
        },
        role: match record.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::Tool => "Tool",
        },
        timestamp: record.timestamp,
        iteration: record.ordinal,
        message_entry_payload: ChatMessagePayload {
            content: record.content,
        },
    }
}

/// Full shared history across all runs, in ordinal order.
pub async fn handler(state: web::Data<AppState>) -> impl Responder {
    let value = state
        .ledger
        .snapshot()
        .into_iter()
        .map(summarize)
        .collect();
    HttpResponse::Ok().json(ChatHistoryResponse { value })
}
