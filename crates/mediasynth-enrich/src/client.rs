//! Sentiment classification over HTTP.

use crate::error::{EnrichError, Result};
use crate::types::{parse_classification, Sentiment};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// The model only reads this many characters of input.
pub const MAX_INPUT_CHARS: usize = 512;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can classify a piece of text.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Sentiment>;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Client for a hosted text-classification inference endpoint.
pub struct HuggingFaceClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl HuggingFaceClient {
    pub fn new(api_key: String, url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SentimentAnalyzer for HuggingFaceClient {
    async fn analyze(&self, text: &str) -> Result<Sentiment> {
        let request = InferenceRequest {
            inputs: truncate_chars(text, MAX_INPUT_CHARS),
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_classification(&body)
    }
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Result of classifying one item of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub sentiment: Sentiment,
    /// True when the analyzer failed and the neutral fallback was used.
    pub fallback: bool,
}

/// Classify every text in order, one request at a time.
///
/// A failure for one item never aborts the batch: that item gets
/// [`Sentiment::neutral`] and the next item is tried. `delay` is slept
/// between consecutive requests.
pub async fn analyze_batch(
    analyzer: &dyn SentimentAnalyzer,
    texts: &[String],
    delay: Option<Duration>,
) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::with_capacity(texts.len());

    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }

        let outcome = match analyzer.analyze(text).await {
            Ok(sentiment) => BatchOutcome {
                sentiment,
                fallback: false,
            },
            Err(e) => {
                tracing::warn!(index = i, error = %e, "Sentiment analysis failed, using neutral");
                BatchOutcome {
                    sentiment: Sentiment::neutral(),
                    fallback: true,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}
