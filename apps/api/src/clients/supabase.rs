//! Supabase audit sink — best-effort insert into the `cover_letters` table.
//!
//! The row carries a timestamp only, never request content. Callers schedule
//! the insert off the request path and swallow failures; this is telemetry,
//! not part of the correctness contract.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::clients::AuditSink;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct CoverLetterRow {
    generated_at: DateTime<Utc>,
}

/// Audit sink backed by the Supabase REST endpoint.
#[derive(Clone)]
pub struct SupabaseAudit {
    client: Client,
    url: Option<String>,
    anon_key: Option<String>,
}

impl SupabaseAudit {
    pub fn new(url: Option<String>, anon_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            url: url.map(|u| u.trim_end_matches('/').to_string()),
            anon_key,
        }
    }
}

#[async_trait]
impl AuditSink for SupabaseAudit {
    async fn record_cover_letter(&self) -> anyhow::Result<()> {
        let (url, key) = match (self.url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) => (url, key),
            _ => anyhow::bail!("supabase audit store is not configured"),
        };

        let rows = [CoverLetterRow {
            generated_at: Utc::now(),
        }];

        let response = self
            .client
            .post(format!("{url}/rest/v1/cover_letters"))
            .header("apikey", key)
            .bearer_auth(key)
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("supabase insert failed (status {status}): {body}");
        }

        Ok(())
    }
}
