//! CLI for synthetic media analytics data generation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use duckdb::Connection;
use mediasynth_datagen::duckdb::{validate_load, write_dataset_to_duckdb};
use mediasynth_datagen::output::save_dataset;
use mediasynth_datagen::parquet::write_events_to_parquet;
use mediasynth_datagen::{resolve_seed, seeded_rng, DatasetConfig, DatasetGenerator};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mediasynth")]
#[command(about = "Synthetic writers, articles and visitor events for a media publisher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset and export it
    Generate(GenerateArgs),
    /// Report row counts and dangling references in a loaded warehouse
    Validate {
        /// DuckDB database file
        #[arg(long)]
        duckdb: PathBuf,

        /// Schema holding the tables
        #[arg(long, default_value = "raw")]
        schema: String,
    },
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Output directory for CSV/JSONL (and Parquet) files
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// YAML file overriding the default distributional parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed; a fresh one is drawn and logged when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of writers
    #[arg(long)]
    num_writers: Option<usize>,

    /// Number of articles
    #[arg(long)]
    num_articles: Option<usize>,

    /// Requested number of events (the emitted count may be lower)
    #[arg(long)]
    num_events: Option<usize>,

    /// Also write events as Hive-partitioned Parquet
    #[arg(long)]
    parquet: bool,

    /// Load the dataset into this DuckDB database file
    #[arg(long)]
    duckdb: Option<PathBuf>,

    /// Warehouse schema for --duckdb
    #[arg(long, default_value = "raw")]
    schema: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mediasynth=info".parse()?))
        .init();

    match Cli::parse().command {
        Command::Generate(args) => generate(args),
        Command::Validate { duckdb, schema } => validate(duckdb, &schema),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_yaml_file(path)?,
        None => DatasetConfig::default(),
    };
    if let Some(n) = args.num_writers {
        config.num_writers = n;
    }
    if let Some(n) = args.num_articles {
        config.num_articles = n;
    }
    if let Some(n) = args.num_events {
        config.target_events = n;
    }
    config.validate().context("Invalid configuration")?;

    let seed = resolve_seed(args.seed);
    info!(
        seed,
        start = %config.start_date,
        end = %config.end_date,
        writers = config.num_writers,
        articles = config.num_articles,
        target_events = config.target_events,
        "Generating dataset"
    );

    let start_time = Instant::now();
    let mut rng = seeded_rng(seed);
    let dataset = DatasetGenerator::new(&config).generate(&mut rng)?;
    let elapsed = start_time.elapsed();

    let files = save_dataset(&args.output_dir, &dataset)?;

    if args.parquet {
        let rows = write_events_to_parquet(&args.output_dir, &dataset.events)?;
        info!(rows, "Wrote Parquet partitions");
    }

    if let Some(db_path) = &args.duckdb {
        write_dataset_to_duckdb(db_path, &args.schema, &dataset)?;
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open DuckDB database: {:?}", db_path))?;
        let report = validate_load(&conn, &args.schema)?;
        println!();
        println!("Warehouse load ({:?}, schema {}):", db_path, args.schema);
        print!("{}", report);
    }

    println!();
    println!("Seed: {}", seed);
    print!("{}", dataset.summary());
    println!("Generated in {:.2}s", elapsed.as_secs_f64());
    println!("Files:");
    println!("  {}", files.writers.display());
    println!("  {}", files.articles.display());
    println!("  {}", files.events.display());

    Ok(())
}

fn validate(db_path: PathBuf, schema: &str) -> Result<()> {
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Failed to open DuckDB database: {:?}", db_path))?;
    let report = validate_load(&conn, schema)?;
    print!("{}", report);
    if !report.is_consistent() {
        anyhow::bail!("Referential integrity check failed");
    }
    Ok(())
}
