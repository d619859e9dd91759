use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use incognito_llm::{relay_sse, ChatOptions, ChatRequest, LlmError, ProxyRequest, RelayRecord};
use std::sync::Arc;

use super::{parse_body, prepare_messages};
use crate::{error::ApiResult, state::AppState};

/// Stream a chat turn as server-sent events
///
/// Each event carries one upstream JSON fragment; the stream ends with
/// `data: [DONE]`. An upstream read error aborts the body instead.
pub async fn inference_stream(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, LlmError>>>> {
    let request = parse_body(body)?;
    let upstream = &state.config.inference;

    tracing::info!(
        messages = request.messages.len(),
        mode = ?request.mode,
        "Inference stream request"
    );

    let preamble = state.config.prompts.for_mode(request.mode);
    let messages = prepare_messages(preamble, request.messages).await?;

    let chat_request = ChatRequest::new(upstream.model.clone(), messages)
        .with_options(ChatOptions::new().temperature(upstream.temperature));

    let upstream_stream = state.inference_client.chat_stream(chat_request).await?;

    let sse_stream = relay_sse(upstream_stream).map(|record| {
        record.map(|record| match record {
            RelayRecord::Data(payload) => Event::default().data(payload),
            RelayRecord::Done => Event::default().data("[DONE]"),
        })
    });

    Ok(Sse::new(sse_stream))
}
