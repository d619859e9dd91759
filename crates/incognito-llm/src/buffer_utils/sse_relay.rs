use futures::{Stream, StreamExt};
use std::pin::Pin;

use super::relay_buffer::RelayBuffer;
use crate::error::Result;
use crate::traits::ByteStream;

/// One outgoing server-sent-event record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRecord {
    /// Payload of a `data:` record (an upstream JSON fragment)
    Data(String),
    /// Terminal marker, always the last successful record
    Done,
}

impl RelayRecord {
    /// Wire form of the record, `data: <payload>\n\n`
    pub fn to_sse(&self) -> String {
        match self {
            RelayRecord::Data(payload) => format!("data: {}\n\n", payload),
            RelayRecord::Done => "data: [DONE]\n\n".to_string(),
        }
    }
}

pub type RelayStream = Pin<Box<dyn Stream<Item = Result<RelayRecord>> + Send>>;

/// Payload carried by an upstream line
///
/// Strips an upstream `data:` prefix and drops upstream `[DONE]` markers; the
/// relay emits its own terminator.
pub fn record_payload(line: &str) -> Option<&str> {
    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim_start(),
        None => line,
    };

    if payload.is_empty() || payload == "[DONE]" {
        None
    } else {
        Some(payload)
    }
}

/// Re-frame an upstream byte stream as `data:` records
///
/// Single producer, single consumer: each upstream chunk is pulled only when
/// the consumer asks for the next record. A read error ends the stream with
/// that error and no `Done`.
pub fn relay_sse(upstream: ByteStream) -> RelayStream {
    Box::pin(async_stream::stream! {
        let mut upstream = upstream;
        let mut buffer = RelayBuffer::with_capacity(4096);

        loop {
            match upstream.next().await {
                Some(Ok(bytes)) => {
                    for line in buffer.push(&bytes) {
                        if let Some(payload) = record_payload(&line) {
                            yield Ok(RelayRecord::Data(payload.to_string()));
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::error!("Stream reading error: {}", e);
                    yield Err(e);
                    break;
                }
                None => {
                    let tail = std::mem::take(&mut buffer).finish();
                    if let Some(payload) = tail.as_deref().and_then(record_payload) {
                        yield Ok(RelayRecord::Data(payload.to_string()));
                    }
                    yield Ok(RelayRecord::Done);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_payload() {
        assert_eq!(record_payload(r#"data: {"a":1}"#), Some(r#"{"a":1}"#));
        assert_eq!(record_payload(r#"data:{"a":1}"#), Some(r#"{"a":1}"#));
        assert_eq!(record_payload(r#"{"a":1}"#), Some(r#"{"a":1}"#));
        assert_eq!(record_payload("data: [DONE]"), None);
        assert_eq!(record_payload("data:"), None);
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(RelayRecord::Data("x".into()).to_sse(), "data: x\n\n");
        assert_eq!(RelayRecord::Done.to_sse(), "data: [DONE]\n\n");
    }
}
