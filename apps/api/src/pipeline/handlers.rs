//! Axum route handlers for the analysis pipeline.
//!
//! Two deliberately distinct surfaces: a blocking endpoint that returns the
//! aggregated JSON response, and a streaming endpoint that forwards the
//! generation output as raw text chunks. They disagree on accepted inputs
//! (the streaming variant requires a job URL and takes no pasted text) and
//! are kept separate rather than unified.

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{Json, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::clients::{ChatMessage, CompletionStream, GenerationError, GenerationProvider};
use crate::config::Config;
use crate::errors::AppError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::input::{AnalysisRequest, JobSource};
use crate::pipeline::prompts::{STREAM_PROMPT_TEMPLATE, STREAM_SYSTEM};
use crate::pipeline::{self, AnalysisResponse};
use crate::state::AppState;

/// Upload field name per endpoint. The blocking variant names its upload
/// `resume`; the streaming variant names it `file`. Neither accepts the
/// other's name.
const BLOCKING_UPLOAD_FIELD: &str = "resume";
const STREAM_UPLOAD_FIELD: &str = "file";

/// POST /api/v1/analyze
///
/// Blocking analysis: multipart fields `resume` (PDF) plus `jobUrl` and/or
/// `jobPosting` (pasted text wins). Returns the aggregated response; any
/// stage failure short-circuits to `{ success: false, error }`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let fields = collect_fields(multipart, BLOCKING_UPLOAD_FIELD).await?;
    let request = AnalysisRequest::from_parts(fields.resume, fields.job_url, fields.job_posting)?;

    let response = pipeline::run_analysis(
        state.extractor.clone(),
        state.generation.clone(),
        state.scraper.clone(),
        state.audit.clone(),
        request,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/analyze/stream
///
/// Streaming analysis: multipart fields `file` (PDF) and `jobUrl` (required —
/// no pasted-text alternative). Verifies capability secrets before any work,
/// then streams the generation output as `text/plain` chunks. A mid-stream
/// upstream error terminates the body at the transport level.
pub async fn handle_analyze_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    check_stream_secrets(&state.config)?;

    let fields = collect_fields(multipart, STREAM_UPLOAD_FIELD).await?;
    let (resume, job_url) = stream_inputs(fields)?;

    let job_source = JobSource::Url(job_url.clone());
    let (resume_text, job_description) = tokio::try_join!(
        state.extractor.extract_text(resume),
        pipeline::acquire_job_description(state.scraper.as_ref(), &job_source),
    )?;

    let prompt = STREAM_PROMPT_TEMPLATE
        .replace("{resume}", &resume_text)
        .replace("{job_description}", &job_description);
    let messages = [ChatMessage::system(STREAM_SYSTEM), ChatMessage::user(prompt)];

    let stream = state
        .generation
        .complete_stream(&messages)
        .await
        .map_err(|e| match e {
            GenerationError::MissingApiKey => AppError::ConfigurationMissing("GENERATION_API_KEY"),
            other => AppError::GenerationFailed(other.to_string()),
        })?;

    info!("streaming analysis started for {job_url}");

    stream_response(stream)
}

/// Streaming pre-flight: both capability secrets must be present before any
/// multipart or upstream work happens.
fn check_stream_secrets(config: &Config) -> Result<(), AppError> {
    if config.generation_api_key.is_none() {
        return Err(AppError::ConfigurationMissing("GENERATION_API_KEY"));
    }
    if config.firecrawl_api_key.is_none() {
        return Err(AppError::ConfigurationMissing("FIRECRAWL_API_KEY"));
    }
    Ok(())
}

/// Validates the streaming variant's inputs: an upload plus a job URL.
/// There is no pasted-text alternative here; a `jobPosting` field is ignored.
fn stream_inputs(fields: FormFields) -> Result<(Bytes, String), AppError> {
    let resume = fields
        .resume
        .filter(|bytes| !bytes.is_empty())
        .ok_or(AppError::MissingInput)?;
    let job_url = fields
        .job_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(AppError::MissingJobSource)?;
    Ok((resume, job_url))
}

/// Wraps the completion stream in a chunked text response.
fn stream_response(stream: CompletionStream) -> Result<Response, AppError> {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build streaming response: {e}")))
}

/// Raw multipart fields accepted by an endpoint. `upload_field` selects which
/// part name carries the PDF bytes.
#[derive(Debug, Default)]
struct FormFields {
    resume: Option<Bytes>,
    job_url: Option<String>,
    job_posting: Option<String>,
}

async fn collect_fields(
    mut multipart: Multipart,
    upload_field: &str,
) -> Result<FormFields, AppError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidForm(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == upload_field {
            fields.resume = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidForm(e.to_string()))?,
            );
            continue;
        }
        match name.as_str() {
            "jobUrl" => {
                fields.job_url = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidForm(e.to_string()))?,
                );
            }
            "jobPosting" => {
                fields.job_posting = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidForm(e.to_string()))?,
                );
            }
            _ => {} // unknown fields are ignored
        }
    }

    Ok(fields)
}
