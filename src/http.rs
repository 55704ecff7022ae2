use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    chain::InterceptorChain,
    error::ChainError,
    types::{ChatContext, ChatRequest, ChatResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub chain: InterceptorChain,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub content: String,
    #[serde(default)]
    pub context: ChatContext,
}

impl From<ChatBody> for ChatRequest {
    fn from(body: ChatBody) -> Self {
        ChatRequest {
            user_text: body.content,
            context: body.context,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let response = state
        .chain
        .invoke(body.into())
        .await
        .map_err(internal_error)?;

    Ok(Json(response))
}

async fn chat_stream(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state
        .chain
        .invoke_streaming(body.into())
        .map(|item| Ok(sse_event(item)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn sse_event(item: Result<ChatResponse, ChainError>) -> Event {
    match item {
        Ok(fragment) => Event::default()
            .json_data(&fragment)
            .unwrap_or_else(|error| error_event(error.to_string())),
        Err(error) => error_event(error.to_string()),
    }
}

fn error_event(message: String) -> Event {
    Event::default().event("error").data(message)
}

fn internal_error(error: ChainError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}
