use anyhow::Result;
use clap::Parser;
use mediasynth_enrich::{
    enrich_articles, ArticleStore, EnrichConfig, EnrichOptions, HuggingFaceClient,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mediasynth-enrich")]
#[command(about = "Enrich warehouse articles with model-based sentiment")]
struct Args {
    /// DuckDB database file holding the loaded dataset
    #[arg(long)]
    database: PathBuf,

    /// Schema holding article_metadata
    #[arg(long, default_value = "raw")]
    schema: String,

    /// Number of articles fetched for this run
    #[arg(long, default_value = "100")]
    batch_size: usize,

    /// Maximum number of articles to process
    #[arg(long)]
    limit: Option<usize>,

    /// Classify without writing results back
    #[arg(long)]
    dry_run: bool,

    /// Pause between model requests, in milliseconds
    #[arg(long, default_value = "500")]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mediasynth=info".parse()?))
        .init();

    let args = Args::parse();

    let config = EnrichConfig::from_env()?;
    config.log_redacted();

    let client = HuggingFaceClient::new(config.api_key.clone(), config.api_url.clone())?;
    let store = ArticleStore::open(&args.database, &args.schema).await?;

    let options = EnrichOptions {
        batch_size: args.batch_size,
        limit: args.limit,
        dry_run: args.dry_run,
        delay: (args.delay_ms > 0).then(|| Duration::from_millis(args.delay_ms)),
    };
    info!(
        database = ?args.database,
        schema = %args.schema,
        batch_size = options.batch_size,
        limit = ?options.limit,
        dry_run = options.dry_run,
        "Starting enrichment"
    );

    let start_time = Instant::now();
    let report = enrich_articles(&store, &client, &options).await?;
    let elapsed = start_time.elapsed();
    let remaining = store.count_unenriched().await?;

    println!();
    println!("Mode: {}", if options.dry_run { "DRY RUN" } else { "PRODUCTION" });
    print!("{}", report);
    println!("Still unenriched:   {}", remaining);
    println!("Time elapsed: {:.1}s", elapsed.as_secs_f64());
    if report.processed > 0 {
        println!(
            "Average per article: {:.2}s",
            elapsed.as_secs_f64() / report.processed as f64
        );
    }

    Ok(())
}
