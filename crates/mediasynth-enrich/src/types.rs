use crate::error::{EnrichError, Result};
use serde::{Deserialize, Serialize};

pub const POSITIVE_LABEL: &str = "POSITIVE";
pub const NEGATIVE_LABEL: &str = "NEGATIVE";
pub const NEUTRAL_LABEL: &str = "NEUTRAL";

/// Score used for a polarity the model did not report.
const DEFAULT_SCORE: f64 = 0.5;

/// Sentiment assigned to one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub positive: f64,
    pub negative: f64,
    pub label: String,
}

impl Sentiment {
    /// The fallback used whenever the model cannot be reached or understood.
    pub fn neutral() -> Self {
        Self {
            positive: DEFAULT_SCORE,
            negative: DEFAULT_SCORE,
            label: NEUTRAL_LABEL.to_string(),
        }
    }
}

/// One `{label, score}` entry in a classification response.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// The model returns either `[[{label, score}, ...]]` or `[{label, score}, ...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassificationResponse::Flat(scores) => scores,
        }
    }
}

/// Parse a classification response body into a [`Sentiment`].
///
/// The label is the highest-scoring entry. A missing POSITIVE or NEGATIVE
/// entry scores 0.5.
pub fn parse_classification(body: &str) -> Result<Sentiment> {
    let response: ClassificationResponse = serde_json::from_str(body)?;
    let scores = response.into_scores();

    let label = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|s| s.label.clone())
        .ok_or_else(|| EnrichError::Parse("empty classification response".to_string()))?;

    let score_of = |wanted: &str| {
        scores
            .iter()
            .find(|s| s.label == wanted)
            .map(|s| s.score)
            .unwrap_or(DEFAULT_SCORE)
    };

    Ok(Sentiment {
        positive: score_of(POSITIVE_LABEL),
        negative: score_of(NEGATIVE_LABEL),
        label,
    })
}

/// The fields of an article the enrichment job reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleText {
    pub article_id: String,
    pub title: String,
    pub category: String,
}
