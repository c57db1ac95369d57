//! Sentiment enrichment for generated articles.
//!
//! Reads articles without sentiment from the DuckDB warehouse, classifies
//! their titles with a hosted model, and writes the four sentiment fields
//! back. A failed classification degrades to a neutral result rather than
//! failing the run.

pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod store;
pub mod types;

pub use client::{analyze_batch, BatchOutcome, HuggingFaceClient, SentimentAnalyzer};
pub use config::EnrichConfig;
pub use enrich::{enrich_articles, EnrichOptions, EnrichReport};
pub use error::{EnrichError, Result};
pub use store::ArticleStore;
pub use types::{ArticleText, Sentiment};
