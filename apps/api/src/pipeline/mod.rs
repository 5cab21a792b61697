//! Analysis pipeline — coordinates extraction, acquisition, and generation.
//!
//! Flow: normalize → (extract ‖ acquire) → analysis → cover letter →
//! audit (detached) → aggregate.
//!
//! Every stage failure aborts the remaining pipeline for its request and no
//! partial results are returned; the audit insert is the sole fire-and-forget
//! exception.

pub mod analysis;
pub mod cover_letter;
pub mod extract;
pub mod handlers;
pub mod input;
pub mod prompts;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::clients::{AuditSink, GenerationProvider, JobScraper, ScrapeError};
use crate::errors::AppError;
use crate::pipeline::analysis::AnalysisResult;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::input::{AnalysisRequest, JobSource};

/// Aggregate response returned by the blocking endpoint. Echoes the extracted
/// résumé text and the job description alongside the generated outputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the full blocking pipeline for one validated request.
///
/// Steps:
/// 1. extract résumé text ‖ acquire job description (independent inputs,
///    first failure wins)
/// 2. gap analysis (sync JSON mode)
/// 3. cover letter, addressing the gaps the analysis found
/// 4. detach the audit insert
/// 5. aggregate the response
pub async fn run_analysis(
    extractor: Arc<dyn TextExtractor>,
    generation: Arc<dyn GenerationProvider>,
    scraper: Arc<dyn JobScraper>,
    audit: Arc<dyn AuditSink>,
    request: AnalysisRequest,
) -> Result<AnalysisResponse, AppError> {
    let (resume_text, job_description) = tokio::try_join!(
        extractor.extract_text(request.resume),
        acquire_job_description(scraper.as_ref(), &request.job_source),
    )?;

    info!(
        "inputs ready: resume {} chars, job description {} chars",
        resume_text.len(),
        job_description.len()
    );

    let analysis =
        analysis::request_analysis(generation.as_ref(), &resume_text, &job_description).await?;
    info!(
        "analysis complete: {} missing requirements, {} improvements",
        analysis.missing_requirements.len(),
        analysis.improvements.len()
    );

    let cover_letter = cover_letter::request_cover_letter(
        generation.as_ref(),
        &resume_text,
        &job_description,
        Some(&analysis),
    )
    .await?;

    spawn_audit(audit);

    Ok(AnalysisResponse {
        success: true,
        analysis: Some(analysis),
        cover_letter: Some(cover_letter),
        job_description: Some(job_description),
        resume: Some(resume_text),
        error: None,
    })
}

/// Returns pasted text verbatim with zero network calls; otherwise fetches
/// the URL through the scraper.
pub(crate) async fn acquire_job_description(
    scraper: &dyn JobScraper,
    source: &JobSource,
) -> Result<String, AppError> {
    match source {
        JobSource::Pasted(text) => Ok(text.clone()),
        JobSource::Url(url) => scraper.fetch_markdown(url).await.map_err(|e| match e {
            ScrapeError::MissingApiKey => AppError::ConfigurationMissing("FIRECRAWL_API_KEY"),
            other => AppError::ScrapeFailed(other.to_string()),
        }),
    }
}

/// Queues the audit insert off the request path. At-most-once; failures are
/// logged and swallowed.
fn spawn_audit(audit: Arc<dyn AuditSink>) {
    tokio::spawn(async move {
        if let Err(e) = audit.record_cover_letter().await {
            warn!("cover letter audit insert failed: {e:#}");
        }
    });
}
