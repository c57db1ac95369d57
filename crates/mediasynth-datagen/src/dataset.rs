//! End-to-end generation of the three populations.

use crate::articles::generate_articles;
use crate::config::DatasetConfig;
use crate::error::ConfigError;
use crate::events::generate_events;
use crate::model::{Article, Event, EventName, Writer};
use crate::writers::generate_writers;
use rand::RngCore;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// A generated dataset: writers, the articles they wrote, and the events
/// recorded against those articles.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub writers: Vec<Writer>,
    pub articles: Vec<Article>,
    pub events: Vec<Event>,
    /// Prospective events dropped for predating their article.
    pub discarded_events: usize,
}

/// Runs the writer, article and event phases in order against one RNG.
pub struct DatasetGenerator<'a> {
    config: &'a DatasetConfig,
}

impl<'a> DatasetGenerator<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Result<Dataset, ConfigError> {
        let config = self.config;

        info!(count = config.num_writers, "Generating writers");
        let writers = generate_writers(config, config.num_writers, rng)?;

        info!(count = config.num_articles, "Generating articles");
        let articles = generate_articles(config, config.num_articles, &writers, rng)?;

        info!(target_events = config.target_events, "Generating events");
        let stream = generate_events(config, config.target_events, &articles, rng)?;

        Ok(Dataset {
            writers,
            articles,
            events: stream.events,
            discarded_events: stream.discarded,
        })
    }
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        let mut event_type_counts = BTreeMap::new();
        for event in &self.events {
            *event_type_counts.entry(event.event_name).or_insert(0) += 1;
        }
        DatasetSummary {
            writers: self.writers.len(),
            articles: self.articles.len(),
            events: self.events.len(),
            discarded_events: self.discarded_events,
            event_type_counts,
        }
    }
}

/// Row counts and the event-type breakdown of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub writers: usize,
    pub articles: usize,
    pub events: usize,
    pub discarded_events: usize,
    pub event_type_counts: BTreeMap<EventName, usize>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Writers:  {}", self.writers)?;
        writeln!(f, "Articles: {}", self.articles)?;
        writeln!(
            f,
            "Events:   {} ({} discarded as predating their article)",
            self.events, self.discarded_events
        )?;
        for (name, count) in &self.event_type_counts {
            let pct = if self.events > 0 {
                *count as f64 * 100.0 / self.events as f64
            } else {
                0.0
            };
            writeln!(f, "  {:<16} {:>9} ({:.1}%)", name.as_str(), count, pct)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn small_config() -> DatasetConfig {
        DatasetConfig {
            num_writers: 5,
            num_articles: 50,
            target_events: 2000,
            events: crate::config::EventConfig {
                visitor_pool_size: 100,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = small_config();
        let generator = DatasetGenerator::new(&config);

        let first = generator.generate(&mut seeded_rng(42)).unwrap();
        let second = generator.generate(&mut seeded_rng(42)).unwrap();
        assert_eq!(first, second);

        let other = generator.generate(&mut seeded_rng(43)).unwrap();
        assert_ne!(first.events, other.events);
    }

    #[test]
    fn test_summary_counts() {
        let config = small_config();
        let dataset = DatasetGenerator::new(&config)
            .generate(&mut seeded_rng(1))
            .unwrap();
        let summary = dataset.summary();

        assert_eq!(summary.writers, 5);
        assert_eq!(summary.articles, 50);
        assert_eq!(summary.events + summary.discarded_events, 2000);
        assert_eq!(
            summary.event_type_counts.values().sum::<usize>(),
            summary.events
        );

        let text = summary.to_string();
        assert!(text.contains("Writers:  5"));
        assert!(text.contains("page_view"));
    }

    #[test]
    fn test_empty_dataset() {
        let config = DatasetConfig {
            num_writers: 0,
            num_articles: 0,
            target_events: 0,
            ..Default::default()
        };
        let dataset = DatasetGenerator::new(&config)
            .generate(&mut seeded_rng(1))
            .unwrap();
        assert!(dataset.writers.is_empty());
        assert!(dataset.articles.is_empty());
        assert!(dataset.events.is_empty());
        assert!(dataset.summary().event_type_counts.is_empty());
    }
}
