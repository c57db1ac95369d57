//! Enrichment runs against a warehouse loaded with a generated dataset.

use async_trait::async_trait;
use duckdb::Connection;
use mediasynth_datagen::config::EventConfig;
use mediasynth_datagen::duckdb::{load_dataset, write_dataset_to_duckdb};
use mediasynth_datagen::{seeded_rng, Dataset, DatasetConfig, DatasetGenerator};
use mediasynth_enrich::types::NEUTRAL_LABEL;
use mediasynth_enrich::{
    enrich_articles, ArticleStore, EnrichError, EnrichOptions, HuggingFaceClient, Sentiment,
    SentimentAnalyzer,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn dataset() -> Dataset {
    let config = DatasetConfig {
        num_writers: 3,
        num_articles: 12,
        target_events: 100,
        events: EventConfig {
            visitor_pool_size: 20,
            ..Default::default()
        },
        ..Default::default()
    };
    DatasetGenerator::new(&config)
        .generate(&mut seeded_rng(11))
        .unwrap()
}

fn loaded_store() -> ArticleStore {
    let conn = Connection::open_in_memory().unwrap();
    load_dataset(&conn, "raw", &dataset()).unwrap();
    ArticleStore::from_connection(conn, "raw").unwrap()
}

/// Alternates positive and failing results.
struct AlternatingAnalyzer {
    calls: AtomicUsize,
}

impl AlternatingAnalyzer {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for AlternatingAnalyzer {
    async fn analyze(&self, _text: &str) -> mediasynth_enrich::Result<Sentiment> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 1 {
            return Err(EnrichError::Network("connection reset".to_string()));
        }
        Ok(Sentiment {
            positive: 0.8,
            negative: 0.2,
            label: "POSITIVE".to_string(),
        })
    }
}

fn options(batch_size: usize, limit: Option<usize>, dry_run: bool) -> EnrichOptions {
    EnrichOptions {
        batch_size,
        limit,
        dry_run,
        delay: None,
    }
}

#[tokio::test]
async fn test_fetch_and_update() {
    let store = loaded_store();
    assert_eq!(store.count_unenriched().await.unwrap(), 12);

    let articles = store.fetch_unenriched(5).await.unwrap();
    assert_eq!(articles.len(), 5);
    assert_eq!(articles[0].article_id, "art_0001");

    let sentiment = Sentiment {
        positive: 0.9,
        negative: 0.1,
        label: "POSITIVE".to_string(),
    };
    let updated = store
        .update_sentiment("art_0001", &sentiment)
        .await
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(store.sentiment("art_0001").await.unwrap(), Some(sentiment));
    assert_eq!(store.count_unenriched().await.unwrap(), 11);

    let next = store.fetch_unenriched(5).await.unwrap();
    assert!(next.iter().all(|a| a.article_id != "art_0001"));

    let missing = store
        .update_sentiment("art_9999", &Sentiment::neutral())
        .await
        .unwrap();
    assert_eq!(missing, 0);
}

#[tokio::test]
async fn test_enrich_writes_results_and_fallbacks() {
    let store = loaded_store();
    let analyzer = AlternatingAnalyzer::new();

    let report = enrich_articles(&store, &analyzer, &options(100, None, false))
        .await
        .unwrap();

    assert_eq!(report.processed, 12);
    assert_eq!(report.updated, 12);
    assert_eq!(report.fallbacks, 6);
    assert_eq!(report.by_label.get("POSITIVE"), Some(&6));
    assert_eq!(report.by_label.get(NEUTRAL_LABEL), Some(&6));
    assert_eq!(store.count_unenriched().await.unwrap(), 0);

    let second = store.sentiment("art_0002").await.unwrap().unwrap();
    assert_eq!(second, Sentiment::neutral());
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let store = loaded_store();
    let analyzer = AlternatingAnalyzer::new();

    let report = enrich_articles(&store, &analyzer, &options(100, Some(4), true))
        .await
        .unwrap();

    assert_eq!(report.processed, 4);
    assert_eq!(report.updated, 0);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 4);
    assert_eq!(store.count_unenriched().await.unwrap(), 12);
}

#[tokio::test]
async fn test_limit_and_batch_size_cap_the_run() {
    let store = loaded_store();
    let analyzer = AlternatingAnalyzer::new();

    let report = enrich_articles(&store, &analyzer, &options(3, Some(10), false))
        .await
        .unwrap();
    assert_eq!(report.processed, 3);
    assert_eq!(store.count_unenriched().await.unwrap(), 9);

    let report = enrich_articles(&store, &analyzer, &options(100, Some(2), false))
        .await
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(store.count_unenriched().await.unwrap(), 7);
}

#[tokio::test]
async fn test_nothing_to_enrich() {
    let store = loaded_store();
    let analyzer = AlternatingAnalyzer::new();
    enrich_articles(&store, &AlwaysNeutral, &options(100, None, false))
        .await
        .unwrap();

    let report = enrich_articles(&store, &analyzer, &options(100, None, false))
        .await
        .unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
}

struct AlwaysNeutral;

#[async_trait]
impl SentimentAnalyzer for AlwaysNeutral {
    async fn analyze(&self, _text: &str) -> mediasynth_enrich::Result<Sentiment> {
        Ok(Sentiment::neutral())
    }
}

#[tokio::test]
async fn test_open_store_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("warehouse.duckdb");
    write_dataset_to_duckdb(&db_path, "analytics", &dataset()).unwrap();

    let store = ArticleStore::open(&db_path, "analytics").await.unwrap();
    assert_eq!(store.count_unenriched().await.unwrap(), 12);

    assert!(ArticleStore::open(&db_path, "bad schema").await.is_err());
}

/// Serve one HTTP request with a canned JSON body and return the raw request.
async fn serve_once(listener: TcpListener, status: &'static str, body: &'static str) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
        if n == 0 {
            break;
        }
    }

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();

    String::from_utf8_lossy(&request).into_owned()
}

#[tokio::test]
async fn test_client_posts_truncated_input_with_bearer_auth() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/models/test", listener.local_addr().unwrap());
    let server = tokio::spawn(serve_once(
        listener,
        "200 OK",
        r#"[[{"label":"NEGATIVE","score":0.75},{"label":"POSITIVE","score":0.25}]]"#,
    ));

    let client = HuggingFaceClient::new("hf_test".to_string(), url).unwrap();
    let long_title = "x".repeat(700);
    let sentiment = client.analyze(&long_title).await.unwrap();

    assert_eq!(sentiment.label, "NEGATIVE");
    assert_eq!(sentiment.negative, 0.75);
    assert_eq!(sentiment.positive, 0.25);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /models/test"));
    assert!(request.to_lowercase().contains("authorization: bearer hf_test"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["inputs"].as_str().unwrap().len(), 512);
}

#[tokio::test]
async fn test_client_reports_api_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/models/test", listener.local_addr().unwrap());
    let server = tokio::spawn(serve_once(
        listener,
        "503 Service Unavailable",
        r#"{"error":"Model is currently loading"}"#,
    ));

    let client = HuggingFaceClient::new("hf_test".to_string(), url).unwrap();
    let err = client.analyze("Headline").await.unwrap_err();
    match err {
        EnrichError::Api { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("loading"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
    server.await.unwrap();
}
