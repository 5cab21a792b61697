//! Input Normalizer — validates raw form fields into an `AnalysisRequest`.

use bytes::Bytes;

use crate::errors::AppError;

/// Where the job description comes from. Pasted text wins over a URL when
/// both are submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Pasted(String),
    Url(String),
}

/// A validated analysis request: résumé bytes plus exactly one job source.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume: Bytes,
    pub job_source: JobSource,
}

impl AnalysisRequest {
    /// Builds a request from raw multipart fields. Blank strings and empty
    /// uploads count as absent. Pure validation, no side effects.
    pub fn from_parts(
        resume: Option<Bytes>,
        job_url: Option<String>,
        job_posting: Option<String>,
    ) -> Result<Self, AppError> {
        let resume = resume
            .filter(|bytes| !bytes.is_empty())
            .ok_or(AppError::MissingInput)?;

        let job_source = match (non_blank(job_posting), non_blank(job_url)) {
            (Some(text), _) => JobSource::Pasted(text),
            (None, Some(url)) => JobSource::Url(url),
            (None, None) => return Err(AppError::MissingJobSource),
        };

        Ok(Self { resume, job_source })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Option<Bytes> {
        Some(Bytes::from_static(b"%PDF-1.4 fake"))
    }

    #[test]
    fn test_missing_resume_is_rejected() {
        let err = AnalysisRequest::from_parts(None, Some("https://jobs.example.com".into()), None)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingInput));
    }

    #[test]
    fn test_empty_upload_counts_as_missing_resume() {
        let err = AnalysisRequest::from_parts(
            Some(Bytes::new()),
            Some("https://jobs.example.com".into()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingInput));
    }

    #[test]
    fn test_missing_job_source_is_rejected() {
        let err = AnalysisRequest::from_parts(pdf_bytes(), None, None).unwrap_err();
        assert!(matches!(err, AppError::MissingJobSource));
    }

    #[test]
    fn test_blank_fields_count_as_absent() {
        let err = AnalysisRequest::from_parts(pdf_bytes(), Some("  ".into()), Some("\n".into()))
            .unwrap_err();
        assert!(matches!(err, AppError::MissingJobSource));
    }

    #[test]
    fn test_pasted_text_wins_over_url() {
        let request = AnalysisRequest::from_parts(
            pdf_bytes(),
            Some("https://jobs.example.com/rust".into()),
            Some("Requires: Rust, Kubernetes".into()),
        )
        .unwrap();
        assert_eq!(
            request.job_source,
            JobSource::Pasted("Requires: Rust, Kubernetes".into())
        );
    }

    #[test]
    fn test_url_is_used_when_no_text_is_pasted() {
        let request = AnalysisRequest::from_parts(
            pdf_bytes(),
            Some("https://jobs.example.com/rust".into()),
            None,
        )
        .unwrap();
        assert_eq!(
            request.job_source,
            JobSource::Url("https://jobs.example.com/rust".into())
        );
    }
}
