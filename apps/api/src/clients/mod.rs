//! Capability clients. Each external service the pipeline orchestrates sits
//! behind a trait here so handlers take injected handles and tests can
//! substitute doubles.
//!
//! The handles are stateless dispatchers: constructed once at startup and
//! shared read-only across requests.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

pub mod firecrawl;
pub mod openai;
pub mod supabase;

pub use firecrawl::{FirecrawlClient, ScrapeError};
pub use openai::{GenerationError, OpenAiClient};
pub use supabase::SupabaseAudit;

/// A single chat message sent to the generation capability.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Byte chunks of an in-flight streaming completion.
pub type CompletionStream = BoxStream<'static, Result<Bytes, GenerationError>>;

/// External text-generation capability (LLM).
///
/// One provider implementation serves every pipeline variant; endpoint and
/// model are selected via configuration, not duplicated code paths.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Completes the conversation and returns the full response text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;

    /// Starts a streaming completion, yielding content deltas as they arrive.
    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionStream, GenerationError>;
}

/// External scraping capability: fetches a web page and converts it to markdown.
#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Fetches the main content of `url` as markdown. Single attempt, no retry.
    async fn fetch_markdown(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Best-effort audit datastore. Callers schedule this off the request path
/// and swallow failures.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records that a cover letter was generated. Timestamp only, no content.
    async fn record_cover_letter(&self) -> anyhow::Result<()>;
}
