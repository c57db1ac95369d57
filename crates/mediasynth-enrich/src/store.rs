//! Article sentiment storage in the DuckDB warehouse.
//!
//! DuckDB calls are synchronous, so each one runs in `spawn_blocking` against
//! a connection shared through `Arc<Mutex<_>>`.

use crate::error::{EnrichError, Result};
use crate::types::{ArticleText, Sentiment};
use duckdb::{params, Connection};
use mediasynth_datagen::duckdb::{check_schema_name, ARTICLES_TABLE};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ArticleStore {
    connection: Arc<Mutex<Connection>>,
    table: String,
}

impl ArticleStore {
    /// Open the warehouse file and point at `schema.article_metadata`.
    pub async fn open(database_path: &Path, schema: &str) -> Result<Self> {
        let database_path = database_path.to_owned();
        let connection = tokio::task::spawn_blocking(move || Connection::open(&database_path))
            .await
            .map_err(|e| EnrichError::Store(e.to_string()))??;
        Self::from_connection(connection, schema)
    }

    /// Wrap an already-open connection.
    pub fn from_connection(connection: Connection, schema: &str) -> Result<Self> {
        check_schema_name(schema).map_err(|e| EnrichError::Store(e.to_string()))?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            table: format!("{}.{}", schema, ARTICLES_TABLE),
        })
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let conn = lock(&connection)?;
            f(&conn)
        })
        .await
        .map_err(|e| EnrichError::Store(e.to_string()))?
    }

    /// Articles missing a sentiment label or enrichment timestamp, by id.
    pub async fn fetch_unenriched(&self, limit: usize) -> Result<Vec<ArticleText>> {
        let sql = format!(
            "SELECT article_id, title, category FROM {} \
             WHERE sentiment_enriched_at IS NULL OR sentiment_label IS NULL \
             ORDER BY article_id LIMIT {}",
            self.table, limit
        );
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ArticleText {
                        article_id: row.get(0)?,
                        title: row.get(1)?,
                        category: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn count_unenriched(&self) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} \
             WHERE sentiment_enriched_at IS NULL OR sentiment_label IS NULL",
            self.table
        );
        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Write the sentiment fields and stamp the enrichment time.
    /// Returns the number of rows updated (0 for an unknown id).
    pub async fn update_sentiment(&self, article_id: &str, sentiment: &Sentiment) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET \
             sentiment_score_positive = ?, \
             sentiment_score_negative = ?, \
             sentiment_label = ?, \
             sentiment_enriched_at = CURRENT_TIMESTAMP \
             WHERE article_id = ?",
            self.table
        );
        let article_id = article_id.to_string();
        let sentiment = sentiment.clone();
        self.with_connection(move |conn| {
            let updated = conn.execute(
                &sql,
                params![
                    sentiment.positive,
                    sentiment.negative,
                    sentiment.label,
                    article_id
                ],
            )?;
            Ok(updated)
        })
        .await
    }

    /// Stored sentiment for an article, if it has been enriched.
    pub async fn sentiment(&self, article_id: &str) -> Result<Option<Sentiment>> {
        let sql = format!(
            "SELECT sentiment_score_positive, sentiment_score_negative, sentiment_label \
             FROM {} WHERE article_id = ? AND sentiment_label IS NOT NULL",
            self.table
        );
        let article_id = article_id.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query_map([&article_id], |row| {
                Ok(Sentiment {
                    positive: row.get(0)?,
                    negative: row.get(1)?,
                    label: row.get(2)?,
                })
            })?;
            Ok(rows.next().transpose()?)
        })
        .await
    }
}

fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    connection
        .lock()
        .map_err(|_| EnrichError::Store("connection lock poisoned".to_string()))
}
