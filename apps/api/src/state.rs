use std::sync::Arc;

use crate::clients::{AuditSink, GenerationProvider, JobScraper};
use crate::config::Config;
use crate::pipeline::extract::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Each capability handle is a stateless dispatcher constructed once at
/// startup and reused read-only across requests; the traits exist so tests
/// can substitute doubles.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub generation: Arc<dyn GenerationProvider>,
    pub scraper: Arc<dyn JobScraper>,
    pub audit: Arc<dyn AuditSink>,
    pub config: Config,
}
