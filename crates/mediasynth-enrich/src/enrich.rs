//! One enrichment run: fetch unenriched articles, classify titles, store results.

use crate::client::{analyze_batch, SentimentAnalyzer};
use crate::error::Result;
use crate::store::ArticleStore;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Maximum number of articles fetched per run.
    pub batch_size: usize,
    /// Further cap on the number processed.
    pub limit: Option<usize>,
    /// Classify but do not write anything back.
    pub dry_run: bool,
    /// Pause between model requests.
    pub delay: Option<Duration>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            limit: None,
            dry_run: false,
            delay: Some(Duration::from_millis(500)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    pub processed: usize,
    pub updated: usize,
    /// Articles that got the neutral fallback.
    pub fallbacks: usize,
    pub by_label: BTreeMap<String, usize>,
}

impl fmt::Display for EnrichReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Articles processed: {}", self.processed)?;
        writeln!(f, "Articles updated:   {}", self.updated)?;
        writeln!(f, "Neutral fallbacks:  {}", self.fallbacks)?;
        for (label, count) in &self.by_label {
            writeln!(f, "  {:<10} {}", label, count)?;
        }
        Ok(())
    }
}

/// Enrich up to `min(batch_size, limit)` articles that have no sentiment yet.
///
/// Classification failures never fail the run; store failures do.
pub async fn enrich_articles(
    store: &ArticleStore,
    analyzer: &dyn SentimentAnalyzer,
    options: &EnrichOptions,
) -> Result<EnrichReport> {
    let fetch = options
        .limit
        .map_or(options.batch_size, |limit| limit.min(options.batch_size));
    let articles = store.fetch_unenriched(fetch).await?;
    info!(found = articles.len(), dry_run = options.dry_run, "Fetched unenriched articles");

    let mut report = EnrichReport::default();
    if articles.is_empty() {
        return Ok(report);
    }

    let titles: Vec<String> = articles.iter().map(|a| a.title.clone()).collect();
    let outcomes = analyze_batch(analyzer, &titles, options.delay).await;

    for (article, outcome) in articles.iter().zip(&outcomes) {
        let sentiment = &outcome.sentiment;
        info!(
            article_id = %article.article_id,
            category = %article.category,
            label = %sentiment.label,
            positive = sentiment.positive,
            negative = sentiment.negative,
            "Classified article"
        );

        report.processed += 1;
        if outcome.fallback {
            report.fallbacks += 1;
        }
        *report.by_label.entry(sentiment.label.clone()).or_insert(0) += 1;

        if !options.dry_run {
            report.updated += store
                .update_sentiment(&article.article_id, sentiment)
                .await?;
        }
    }

    Ok(report)
}
