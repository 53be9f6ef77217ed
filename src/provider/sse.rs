//! Server-sent event decoding for streaming completions.
//!
//! Both backend families speak the same stream shape: `data:` payload
//! lines delimited by blank lines, each payload a chat-completion chunk,
//! terminated by a literal `[DONE]` payload.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::observability::{STREAM_ERRORS, STREAM_FRAGMENTS};

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SseEvent {
    /// A data payload.
    Data(String),

    /// The `[DONE]` end-of-stream marker.
    Done,
}

/// One incremental chunk of a streaming chat completion.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// The text carried by this chunk, if any. Role-only and
    /// finish-reason chunks carry none.
    fn fragment(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

/// Process a stream of bytes into a stream of server-sent events.
pub(crate) fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<SseEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    return Some((event, (stream, buffer)));
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream
                        if !buffer.is_empty() {
                            if let Some((event, _)) = extract_event(&buffer) {
                                return Some((event, (stream, buffer)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by double newlines; lines other than `data:`
/// payloads (comments, event names) are ignored.
fn extract_event(buffer: &str) -> Option<(Result<SseEvent>, String)> {
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut data = None;
    for line in event_text.lines() {
        if let Some(payload) = line.strip_prefix("data:") {
            data = Some(payload.trim());
        }
    }

    match data {
        Some("[DONE]") => Some((Ok(SseEvent::Done), rest)),
        Some(payload) => Some((Ok(SseEvent::Data(payload.to_string())), rest)),
        // An event with no data line carries nothing useful; represent it
        // as an empty payload the chunk parser will reject.
        None => Some((
            Err(Error::serialization(
                format!("SSE event without a data line: '{event_text}'"),
                None,
            )),
            rest,
        )),
    }
}

/// Process a byte stream into a stream of text fragments.
///
/// Chunks that carry no text (role announcements, finish reasons) are
/// skipped. The stream ends at `[DONE]` or when the transport closes.
pub(crate) fn fragment_stream<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    let events = process_sse(byte_stream);

    stream::unfold(Box::pin(events), |mut events| async move {
        loop {
            match events.next().await {
                Some(Ok(SseEvent::Done)) | None => return None,
                Some(Ok(SseEvent::Data(payload))) => {
                    match serde_json::from_str::<ChatCompletionChunk>(&payload) {
                        Ok(chunk) => match chunk.fragment() {
                            Some(text) => {
                                STREAM_FRAGMENTS.click();
                                return Some((Ok(text.to_string()), events));
                            }
                            None => continue,
                        },
                        Err(e) => {
                            STREAM_ERRORS.click();
                            return Some((
                                Err(Error::serialization(
                                    format!("Failed to parse chunk JSON: {e}"),
                                    Some(Box::new(e)),
                                )),
                                events,
                            ));
                        }
                    }
                }
                Some(Err(e)) => {
                    STREAM_ERRORS.click();
                    return Some((Err(e), events));
                }
            }
        }
    })
}
