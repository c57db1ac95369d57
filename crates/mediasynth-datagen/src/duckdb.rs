//! DuckDB warehouse loader using the Appender API.

use crate::dataset::Dataset;
use anyhow::{bail, Context, Result};
use duckdb::{params, Connection};
use std::fmt;
use std::path::Path;
use tracing::info;

pub const WRITERS_TABLE: &str = "writer_metadata";
pub const ARTICLES_TABLE: &str = "article_metadata";
pub const EVENTS_TABLE: &str = "events_raw";

/// Reject schema names that cannot be interpolated as a bare identifier.
pub fn check_schema_name(schema: &str) -> Result<()> {
    let mut chars = schema.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        bail!("Invalid schema name: {:?}", schema);
    }
    Ok(())
}

/// Create (or replace) the three warehouse tables in `schema`.
pub fn create_tables(conn: &Connection, schema: &str) -> Result<()> {
    check_schema_name(schema)?;

    let create_sql = format!(
        r#"
        CREATE SCHEMA IF NOT EXISTS {schema};

        CREATE OR REPLACE TABLE {schema}.{writers} (
            writer_id VARCHAR NOT NULL,
            writer_name VARCHAR NOT NULL,
            primary_category VARCHAR NOT NULL,
            tenure_start_date DATE NOT NULL,
            contract_type VARCHAR NOT NULL,
            target_articles_per_month INTEGER NOT NULL
        );

        CREATE OR REPLACE TABLE {schema}.{articles} (
            article_id VARCHAR NOT NULL,
            title VARCHAR NOT NULL,
            writer_id VARCHAR NOT NULL,
            publish_date DATE NOT NULL,
            category VARCHAR NOT NULL,
            word_count INTEGER NOT NULL,
            is_premium BOOLEAN NOT NULL,
            estimated_rpm DOUBLE NOT NULL,
            sentiment_score_positive DOUBLE,
            sentiment_score_negative DOUBLE,
            sentiment_label VARCHAR,
            sentiment_enriched_at TIMESTAMP
        );

        CREATE OR REPLACE TABLE {schema}.{events} (
            event_date VARCHAR NOT NULL,
            event_timestamp BIGINT NOT NULL,
            event_name VARCHAR NOT NULL,
            user_pseudo_id VARCHAR NOT NULL,
            ga_session_id VARCHAR NOT NULL,
            article_id VARCHAR,
            event_params VARCHAR NOT NULL,
            device VARCHAR NOT NULL,
            geo VARCHAR NOT NULL,
            traffic_source VARCHAR NOT NULL
        );
        "#,
        schema = schema,
        writers = WRITERS_TABLE,
        articles = ARTICLES_TABLE,
        events = EVENTS_TABLE,
    );

    conn.execute_batch(&create_sql)
        .with_context(|| format!("Failed to create tables in schema: {}", schema))
}

/// Replace the warehouse tables in `schema` with the contents of `dataset`.
pub fn load_dataset(conn: &Connection, schema: &str, dataset: &Dataset) -> Result<()> {
    create_tables(conn, schema)?;

    let mut appender = conn
        .appender_to_db(WRITERS_TABLE, schema)
        .with_context(|| format!("Failed to create appender for table: {}", WRITERS_TABLE))?;
    for writer in &dataset.writers {
        appender
            .append_row(params![
                writer.writer_id,
                writer.writer_name,
                writer.primary_category,
                writer.tenure_start_date.to_string(),
                writer.contract_type,
                writer.target_articles_per_month,
            ])
            .with_context(|| format!("Failed to append writer {}", writer.writer_id))?;
    }
    appender.flush().context("Failed to flush writers")?;
    drop(appender);
    info!(table = WRITERS_TABLE, rows = dataset.writers.len(), "Loaded table");

    let mut appender = conn
        .appender_to_db(ARTICLES_TABLE, schema)
        .with_context(|| format!("Failed to create appender for table: {}", ARTICLES_TABLE))?;
    for article in &dataset.articles {
        appender
            .append_row(params![
                article.article_id,
                article.title,
                article.writer_id,
                article.publish_date.to_string(),
                article.category,
                article.word_count,
                article.is_premium,
                article.estimated_rpm,
                article.sentiment_score_positive,
                article.sentiment_score_negative,
                article.sentiment_label,
                article
                    .sentiment_enriched_at
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
            ])
            .with_context(|| format!("Failed to append article {}", article.article_id))?;
    }
    appender.flush().context("Failed to flush articles")?;
    drop(appender);
    info!(table = ARTICLES_TABLE, rows = dataset.articles.len(), "Loaded table");

    let mut appender = conn
        .appender_to_db(EVENTS_TABLE, schema)
        .with_context(|| format!("Failed to create appender for table: {}", EVENTS_TABLE))?;
    for (row, event) in dataset.events.iter().enumerate() {
        appender
            .append_row(params![
                event.event_date,
                event.event_timestamp,
                event.event_name.as_str(),
                event.user_pseudo_id,
                event.ga_session_id,
                event.article_id(),
                serde_json::to_string(&event.event_params)?,
                serde_json::to_string(&event.device)?,
                serde_json::to_string(&event.geo)?,
                serde_json::to_string(&event.traffic_source)?,
            ])
            .with_context(|| format!("Failed to append event row {}", row))?;
    }
    appender.flush().context("Failed to flush events")?;
    info!(table = EVENTS_TABLE, rows = dataset.events.len(), "Loaded table");

    Ok(())
}

/// Open (or create) a DuckDB file and load `dataset` into it.
pub fn write_dataset_to_duckdb(db_path: &Path, schema: &str, dataset: &Dataset) -> Result<()> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open DuckDB database: {:?}", db_path))?;
    load_dataset(&conn, schema, dataset)
}

/// Post-load diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub writers: i64,
    pub articles: i64,
    pub events: i64,
    /// Articles whose writer_id has no matching writer.
    pub orphan_articles: i64,
    /// Events whose article_id has no matching article.
    pub orphan_events: i64,
    /// Event counts per event name, most frequent first.
    pub event_type_counts: Vec<(String, i64)>,
}

impl LoadReport {
    pub fn is_consistent(&self) -> bool {
        self.orphan_articles == 0 && self.orphan_events == 0
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} rows", WRITERS_TABLE, self.writers)?;
        writeln!(f, "{}: {} rows", ARTICLES_TABLE, self.articles)?;
        writeln!(f, "{}: {} rows", EVENTS_TABLE, self.events)?;
        writeln!(f, "Articles with unknown writer: {}", self.orphan_articles)?;
        writeln!(f, "Events with unknown article: {}", self.orphan_events)?;
        writeln!(f, "Event types:")?;
        for (name, count) in &self.event_type_counts {
            writeln!(f, "  {:<16} {:>9}", name, count)?;
        }
        Ok(())
    }
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("Failed to run validation query: {}", sql.trim()))
}

/// Count rows and dangling references in the loaded tables.
pub fn validate_load(conn: &Connection, schema: &str) -> Result<LoadReport> {
    check_schema_name(schema)?;
    let writers = format!("{}.{}", schema, WRITERS_TABLE);
    let articles = format!("{}.{}", schema, ARTICLES_TABLE);
    let events = format!("{}.{}", schema, EVENTS_TABLE);

    let orphan_articles = count(
        conn,
        &format!(
            "SELECT COUNT(*) FROM {articles} a \
             LEFT JOIN {writers} w ON a.writer_id = w.writer_id \
             WHERE w.writer_id IS NULL",
        ),
    )?;
    let orphan_events = count(
        conn,
        &format!(
            "SELECT COUNT(*) FROM {events} e \
             LEFT JOIN {articles} a ON e.article_id = a.article_id \
             WHERE a.article_id IS NULL",
        ),
    )?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT event_name, COUNT(*) AS n FROM {events} \
             GROUP BY event_name ORDER BY n DESC, event_name",
        ))
        .context("Failed to prepare event type query")?;
    let event_type_counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .context("Failed to query event types")?
        .collect::<Result<Vec<(String, i64)>, _>>()
        .context("Failed to read event types")?;

    Ok(LoadReport {
        writers: count(conn, &format!("SELECT COUNT(*) FROM {writers}"))?,
        articles: count(conn, &format!("SELECT COUNT(*) FROM {articles}"))?,
        events: count(conn, &format!("SELECT COUNT(*) FROM {events}"))?,
        orphan_articles,
        orphan_events,
        event_type_counts,
    })
}
