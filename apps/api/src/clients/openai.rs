//! Generation client — the single point of entry for all LLM calls.
//!
//! Speaks the OpenAI-compatible chat completions protocol, so the actual
//! provider (OpenAI, Together, any compatible gateway) is chosen purely by
//! configuration: base URL, model, API key. Supports a synchronous mode that
//! returns the full text buffer and a streaming mode that yields SSE content
//! deltas as raw bytes.
//!
//! No retries anywhere: a failed call is terminal for the request that made it.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::clients::{ChatMessage, CompletionStream, GenerationProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Sampling temperature for the streaming variant (the blocking variant uses
/// the provider default).
const STREAM_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generation returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single generation client used by both pipeline variants.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Issues one chat completions request. Checks the API key before any
    /// network work and maps non-success statuses to `GenerationError::Api`.
    async fn send(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages,
            temperature: stream.then_some(STREAM_TEMPERATURE),
            stream,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the provider's error message
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationProvider for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let response: ChatResponse = self.send(messages, false).await?.json().await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyContent)?;

        debug!("generation call succeeded: {} chars", text.len());
        Ok(text)
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionStream, GenerationError> {
        let response = self.send(messages, true).await?;
        Ok(sse_content_stream(response.bytes_stream().boxed()))
    }
}

struct SseState {
    inner: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    buf: String,
    pending: VecDeque<String>,
    done: bool,
}

/// Converts an SSE byte stream from the chat completions API into a stream of
/// content deltas. Each `data:` event carries one JSON chunk; `[DONE]` ends
/// the stream. Events without a text delta (role markers, usage frames) are
/// skipped. A transport error is forwarded once and terminates the stream.
fn sse_content_stream(inner: BoxStream<'static, Result<Bytes, reqwest::Error>>) -> CompletionStream {
    let state = SseState {
        inner,
        buf: String::new(),
        pending: VecDeque::new(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(text) = st.pending.pop_front() {
                return Some((Ok(Bytes::from(text)), st));
            }
            if st.done {
                return None;
            }

            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    st.buf.push_str(&String::from_utf8_lossy(&chunk));
                    for payload in drain_events(&mut st.buf) {
                        if payload == "[DONE]" {
                            st.done = true;
                            break;
                        }
                        if let Some(content) = delta_content(&payload) {
                            st.pending.push_back(content);
                        }
                    }
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(GenerationError::Http(e)), st));
                }
                None => st.done = true,
            }
        }
    })
    .boxed()
}

/// Removes complete lines from `buf`, returning the payload of every `data:`
/// line. Partial trailing lines stay buffered until the next chunk.
fn drain_events(buf: &mut String) -> Vec<String> {
    let mut events = Vec::new();
    while let Some(pos) = buf.find('\n') {
        let line: String = buf.drain(..=pos).collect();
        let line = line.trim();
        if let Some(payload) = line.strip_prefix("data:") {
            let payload = payload.trim();
            if !payload.is_empty() {
                events.push(payload.to_string());
            }
        }
    }
    events
}

/// Extracts the text delta from one streamed chunk, if it carries any.
fn delta_content(payload: &str) -> Option<String> {
    serde_json::from_str::<StreamChunk>(payload)
        .ok()?
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[test]
    fn test_drain_events_extracts_data_payloads() {
        let mut buf = String::from(
            "data: {\"a\":1}\n\ndata: {\"b\":2}\n\ndata: [DONE]\n\n",
        );
        let events = drain_events(&mut buf);
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}", "[DONE]"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drain_events_keeps_partial_line_buffered() {
        let mut buf = String::from("data: {\"a\":1}\ndata: {\"b\"");
        let events = drain_events(&mut buf);
        assert_eq!(events, vec!["{\"a\":1}"]);
        assert_eq!(buf, "data: {\"b\"");
    }

    #[test]
    fn test_drain_events_ignores_non_data_lines() {
        let mut buf = String::from(": keep-alive\n\nevent: message\ndata: {\"a\":1}\n");
        let events = drain_events(&mut buf);
        assert_eq!(events, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_delta_content_reads_first_choice() {
        let payload = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(delta_content(payload), Some("Hel".to_string()));
    }

    #[test]
    fn test_delta_content_skips_empty_and_missing_deltas() {
        assert_eq!(delta_content(r#"{"choices":[{"delta":{}}]}"#), None);
        assert_eq!(delta_content(r#"{"choices":[{"delta":{"content":""}}]}"#), None);
        assert_eq!(delta_content(r#"{"choices":[]}"#), None);
        assert_eq!(delta_content("not json"), None);
    }

    #[tokio::test]
    async fn test_sse_content_stream_reassembles_split_chunks() {
        // An event boundary split across two transport chunks must still
        // produce one delta per event.
        let chunks: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: {\"choi",
            )),
            Ok(Bytes::from_static(
                b"ces\":[{\"delta\":{\"content\":\" world\"}}]}\n\ndata: [DONE]\n\n",
            )),
        ];

        let mut out = sse_content_stream(stream::iter(chunks).boxed());
        let mut collected = String::new();
        while let Some(item) = out.next().await {
            collected.push_str(std::str::from_utf8(&item.unwrap()).unwrap());
        }
        assert_eq!(collected, "Hello world");
    }

    #[tokio::test]
    async fn test_sse_content_stream_stops_at_done_marker() {
        let chunks: Vec<Result<Bytes, reqwest::Error>> = vec![Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\ndata: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        ))];

        let mut out = sse_content_stream(stream::iter(chunks).boxed());
        let first = out.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"x");
        assert!(out.next().await.is_none());
    }
}
