pub mod attestation;
pub mod chat;
pub mod health;
pub mod inference;

use axum::extract::rejection::JsonRejection;
use incognito_llm::{Message, ProxyMessage, ProxyRequest};

use crate::{
    attachments,
    error::{ApiError, ApiResult},
};

/// Unwrap a JSON body, turning extractor rejections into `ApiError::BadRequest`
pub(crate) fn parse_body(
    body: Result<axum::Json<ProxyRequest>, JsonRejection>,
) -> ApiResult<ProxyRequest> {
    body.map(|axum::Json(request)| request)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Upstream message list: mode preamble (when non-empty), then every message
/// with its attachments expanded into the content
///
/// Attachment parsing can decode whole PDFs, so it runs on the blocking pool.
pub(crate) async fn prepare_messages(
    preamble: &str,
    messages: Vec<ProxyMessage>,
) -> ApiResult<Vec<Message>> {
    let mut prepared = Vec::with_capacity(messages.len() + 1);
    if !preamble.trim().is_empty() {
        prepared.push(Message::system(preamble));
    }

    if messages.iter().all(|msg| msg.attachments.is_empty()) {
        prepared.extend(
            messages
                .into_iter()
                .map(|msg| Message::new(msg.role, msg.content)),
        );
        return Ok(prepared);
    }

    let expanded = tokio::task::spawn_blocking(move || {
        messages
            .into_iter()
            .map(|msg| {
                let content = attachments::expand_message(&msg.content, &msg.attachments);
                Message::new(msg.role, content)
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        tracing::error!("Attachment parsing task failed: {}", e);
        ApiError::Internal
    })?;

    prepared.extend(expanded);
    Ok(prepared)
}
