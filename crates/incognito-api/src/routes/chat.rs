use axum::{extract::rejection::JsonRejection, extract::State, Json};
use incognito_llm::{ChatOptions, ChatRequest, ProxyReply, ProxyRequest};
use std::sync::Arc;

use super::{parse_body, prepare_messages};
use crate::{error::ApiResult, state::AppState};

/// Complete (non-streaming) chat turn
///
/// Returns the upstream's first choice and passes its signature through
/// untouched.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> ApiResult<Json<ProxyReply>> {
    let request = parse_body(body)?;
    let upstream = &state.config.chat;

    tracing::info!(
        messages = request.messages.len(),
        mode = ?request.mode,
        "Chat request"
    );

    let preamble = state.config.prompts.for_mode(request.mode);
    let messages = prepare_messages(preamble, request.messages).await?;

    let chat_request = ChatRequest::new(upstream.model.clone(), messages)
        .with_options(ChatOptions::new().temperature(upstream.temperature));

    let response = state.chat_client.chat(chat_request).await?;

    Ok(Json(ProxyReply {
        message: response.message,
        signature: response.signature,
    }))
}
