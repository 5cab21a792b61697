use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Capability secrets are optional at startup: a missing key surfaces as a
/// `ConfigurationMissing` error at the point a request actually needs the
/// capability, never as a blind attempt against the upstream API.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation_api_key: Option<String>,
    pub generation_base_url: String,
    pub generation_model: String,
    pub firecrawl_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            generation_api_key: optional_env("GENERATION_API_KEY"),
            generation_base_url: std::env::var("GENERATION_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            firecrawl_api_key: optional_env("FIRECRAWL_API_KEY"),
            supabase_url: optional_env("SUPABASE_URL"),
            supabase_anon_key: optional_env("SUPABASE_ANON_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
