//! Article corpus.

use crate::config::DatasetConfig;
use crate::error::ConfigError;
use crate::gen::Gen;
use crate::generators::{Chance, Exponential, OneOf, Uniform};
use crate::model::{Article, Writer};
use crate::titles::TitleSynthesizer;
use chrono::{Duration, NaiveDate};
use rand::{Rng, RngCore};

/// Generate `count` articles authored by `writers`, sorted by publish date.
///
/// Authorship is uniform with replacement. An article keeps its writer's
/// primary category with `category_inheritance_prob`, otherwise it draws a
/// category uniformly. Publish dates are recency-biased: an exponential
/// number of days (mean `span / recency_divisor`) back from the end date,
/// capped at the span so every date stays inside the configured range.
pub fn generate_articles(
    config: &DatasetConfig,
    count: usize,
    writers: &[Writer],
    rng: &mut dyn RngCore,
) -> Result<Vec<Article>, ConfigError> {
    if count > 0 && writers.is_empty() {
        return Err(ConfigError::empty("writer population"));
    }

    let params = &config.articles;
    let span = config.span_days();

    let category_gen = OneOf::new("categories", config.categories.clone())?;
    let inherit_gen = Chance::new(
        "articles.category_inheritance_prob",
        params.category_inheritance_prob,
    )?;
    let premium_gen = Chance::new("articles.premium_prob", params.premium_prob)?;
    let word_count_gen = Uniform::new(
        "articles.word_count",
        params.min_word_count,
        params.max_word_count,
    )?;
    let standard_rpm_gen = Uniform::new(
        "articles.standard_rpm",
        params.standard_rpm.min,
        params.standard_rpm.max,
    )?
    .map(round_cents);
    let premium_rpm_gen = Uniform::new(
        "articles.premium_rpm",
        params.premium_rpm.min,
        params.premium_rpm.max,
    )?
    .map(round_cents);
    let days_ago_gen = if span > 0 {
        Some(Exponential::new(
            "articles.recency_divisor",
            params.recency_divisor / span as f64,
        )?)
    } else {
        None
    };
    let titles = TitleSynthesizer::new(params);

    let mut articles = Vec::with_capacity(count);
    for i in 0..count {
        let writer = &writers[rng.gen_range(0..writers.len())];
        let category = if inherit_gen.generate(rng) {
            writer.primary_category.clone()
        } else {
            category_gen.generate(rng)
        };
        let title = titles.synthesize(&category, rng);

        let days_ago = match &days_ago_gen {
            // Truncation matches "whole days ago"; the cap keeps the date in range.
            Some(gen) => (gen.generate(rng) as i64).min(span),
            None => 0,
        };
        let publish_date = config.end_date - Duration::days(days_ago);

        let word_count = word_count_gen.generate(rng);
        let is_premium = premium_gen.generate(rng);
        let estimated_rpm = if is_premium {
            premium_rpm_gen.generate(rng)
        } else {
            standard_rpm_gen.generate(rng)
        };

        articles.push(Article {
            article_id: format!("art_{:04}", i + 1),
            title,
            writer_id: writer.writer_id.clone(),
            publish_date,
            category,
            word_count,
            is_premium,
            estimated_rpm,
            sentiment_score_positive: None,
            sentiment_score_negative: None,
            sentiment_label: None,
            sentiment_enriched_at: None,
        });
    }

    // Stable, so same-day articles keep generation order.
    articles.sort_by_key(|a| a.publish_date);

    Ok(articles)
}

/// Days between an article's publish date and the range end.
pub fn age_days(publish_date: NaiveDate, range_end: NaiveDate) -> i64 {
    (range_end - publish_date).num_days()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
