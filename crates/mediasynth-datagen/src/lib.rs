//! Synthetic media analytics data generation.
//!
//! Produces a referentially consistent dataset for a digital publisher:
//!
//! - a writer population ([`writers`]),
//! - an article corpus authored by those writers ([`articles`]),
//! - a GA4-style visitor event stream against those articles ([`events`]).
//!
//! Every phase draws from one seeded random source, passed by `&mut`, in a
//! fixed order, so the same seed and [`DatasetConfig`] yield the same dataset.
//!
//! ```no_run
//! use mediasynth_datagen::{seeded_rng, DatasetConfig, DatasetGenerator};
//!
//! let config = DatasetConfig::default();
//! let mut rng = seeded_rng(42);
//! let dataset = DatasetGenerator::new(&config).generate(&mut rng)?;
//! println!("{}", dataset.summary());
//! # Ok::<(), mediasynth_datagen::ConfigError>(())
//! ```

pub mod articles;
pub mod config;
pub mod dataset;
pub mod duckdb;
pub mod error;
pub mod events;
pub mod gen;
pub mod generators;
pub mod model;
pub mod output;
pub mod parquet;
pub mod rng;
pub mod titles;
pub mod writers;

pub use articles::generate_articles;
pub use config::DatasetConfig;
pub use dataset::{Dataset, DatasetGenerator, DatasetSummary};
pub use error::ConfigError;
pub use events::{generate_events, EventStream};
pub use gen::Gen;
pub use model::{Article, Event, EventName, EventParam, ParamValue, Writer};
pub use rng::{resolve_seed, seeded_rng};
pub use writers::generate_writers;
