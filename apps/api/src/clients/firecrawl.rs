//! Firecrawl client — fetches a job posting URL and converts it to markdown.
//!
//! One crawl request per acquisition: at most one page, markdown format,
//! main content only. No retries; an upstream failure is terminal for the
//! request that triggered it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::clients::JobScraper;

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1/crawl";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("scraping API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("scrape reported failure")]
    Unsuccessful,

    #[error("scrape returned no content for the first result")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    limit: u32,
    #[serde(rename = "scrapeOptions")]
    scrape_options: ScrapeOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions<'a> {
    formats: [&'a str; 1],
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    success: bool,
    #[serde(default)]
    data: Vec<CrawlDocument>,
}

#[derive(Debug, Deserialize)]
struct CrawlDocument {
    markdown: Option<String>,
}

/// Scraping client backed by the Firecrawl crawl API.
#[derive(Clone)]
pub struct FirecrawlClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl FirecrawlClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: FIRECRAWL_API_URL.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl JobScraper for FirecrawlClient {
    async fn fetch_markdown(&self, url: &str) -> Result<String, ScrapeError> {
        let api_key = self.api_key.as_deref().ok_or(ScrapeError::MissingApiKey)?;

        debug!("crawling job posting: {url}");

        let request_body = CrawlRequest {
            url,
            limit: 1,
            scrape_options: ScrapeOptions {
                formats: ["markdown"],
                only_main_content: true,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let crawl: CrawlResponse = response.json().await?;
        first_markdown(crawl)
    }
}

/// The acquisition rule: the crawl must report success and its first result
/// must carry non-blank markdown.
fn first_markdown(crawl: CrawlResponse) -> Result<String, ScrapeError> {
    if !crawl.success {
        return Err(ScrapeError::Unsuccessful);
    }

    let markdown = crawl
        .data
        .into_iter()
        .next()
        .and_then(|d| d.markdown)
        .unwrap_or_default();

    if markdown.trim().is_empty() {
        return Err(ScrapeError::EmptyContent);
    }

    Ok(markdown)
}
