//! Enrichment settings read from the environment (and a `.env` file).

use crate::error::{EnrichError, Result};
use std::env;
use tracing::info;

pub const API_KEY_VAR: &str = "HUGGINGFACE_API_KEY";
pub const API_URL_VAR: &str = "HUGGINGFACE_API_URL";

pub const DEFAULT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub api_key: String,
    pub api_url: String,
}

impl EnrichConfig {
    /// Load `.env` if present, then read the API key (required) and URL.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EnrichError::MissingEnv(API_KEY_VAR.to_string()))?;
        let api_url = model_url(env::var(API_URL_VAR).ok().as_deref());

        Ok(Self { api_key, api_url })
    }

    /// Log the settings without revealing the key.
    pub fn log_redacted(&self) {
        info!(
            api_url = %self.api_url,
            api_key = %redact(&self.api_key),
            "Enrichment config"
        );
    }
}

/// Resolve the inference URL.
///
/// A custom base URL that does not already name the default model gets the
/// model path appended.
pub fn model_url(custom: Option<&str>) -> String {
    match custom.map(str::trim).filter(|url| !url.is_empty()) {
        None => format!("{}/{}", DEFAULT_API_BASE, DEFAULT_MODEL),
        Some(url) if url.to_lowercase().contains("distilbert") => url.to_string(),
        Some(url) => format!("{}/{}", url.trim_end_matches('/'), DEFAULT_MODEL),
    }
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}
