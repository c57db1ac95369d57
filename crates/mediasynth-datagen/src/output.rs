//! File export: writers and articles as CSV, events as JSON Lines.

use crate::dataset::Dataset;
use crate::model::{Article, Event, Writer};
use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, StringArray, TimestampMicrosecondArray,
    UInt32Array,
};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Date32Type, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const WRITERS_FILE: &str = "writers.csv";
pub const ARTICLES_FILE: &str = "articles.csv";
pub const EVENTS_FILE: &str = "events.jsonl";

/// Paths of the files written by [`save_dataset`].
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub writers: PathBuf,
    pub articles: PathBuf,
    pub events: PathBuf,
}

fn writer_schema() -> Schema {
    Schema::new(vec![
        Field::new("writer_id", DataType::Utf8, false),
        Field::new("writer_name", DataType::Utf8, false),
        Field::new("primary_category", DataType::Utf8, false),
        Field::new("tenure_start_date", DataType::Date32, false),
        Field::new("contract_type", DataType::Utf8, false),
        Field::new("target_articles_per_month", DataType::UInt32, false),
    ])
}

fn article_schema() -> Schema {
    Schema::new(vec![
        Field::new("article_id", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("writer_id", DataType::Utf8, false),
        Field::new("publish_date", DataType::Date32, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("word_count", DataType::UInt32, false),
        Field::new("is_premium", DataType::Boolean, false),
        Field::new("estimated_rpm", DataType::Float64, false),
        Field::new("sentiment_score_positive", DataType::Float64, true),
        Field::new("sentiment_score_negative", DataType::Float64, true),
        Field::new("sentiment_label", DataType::Utf8, true),
        Field::new(
            "sentiment_enriched_at",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
    ])
}

pub fn writers_to_batch(writers: &[Writer]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            writers.iter().map(|w| w.writer_id.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            writers.iter().map(|w| w.writer_name.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            writers.iter().map(|w| w.primary_category.as_str()),
        )),
        Arc::new(Date32Array::from_iter_values(
            writers.iter().map(|w| Date32Type::from_naive_date(w.tenure_start_date)),
        )),
        Arc::new(StringArray::from_iter_values(
            writers.iter().map(|w| w.contract_type.as_str()),
        )),
        Arc::new(UInt32Array::from_iter_values(
            writers.iter().map(|w| w.target_articles_per_month),
        )),
    ];

    RecordBatch::try_new(Arc::new(writer_schema()), columns)
        .context("Failed to create writers record batch")
}

pub fn articles_to_batch(articles: &[Article]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            articles.iter().map(|a| a.article_id.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            articles.iter().map(|a| a.title.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            articles.iter().map(|a| a.writer_id.as_str()),
        )),
        Arc::new(Date32Array::from_iter_values(
            articles.iter().map(|a| Date32Type::from_naive_date(a.publish_date)),
        )),
        Arc::new(StringArray::from_iter_values(
            articles.iter().map(|a| a.category.as_str()),
        )),
        Arc::new(UInt32Array::from_iter_values(
            articles.iter().map(|a| a.word_count),
        )),
        Arc::new(BooleanArray::from(
            articles.iter().map(|a| a.is_premium).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from_iter_values(
            articles.iter().map(|a| a.estimated_rpm),
        )),
        Arc::new(Float64Array::from(
            articles
                .iter()
                .map(|a| a.sentiment_score_positive)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            articles
                .iter()
                .map(|a| a.sentiment_score_negative)
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            articles
                .iter()
                .map(|a| a.sentiment_label.as_deref())
                .collect::<Vec<_>>(),
        )),
        Arc::new(TimestampMicrosecondArray::from(
            articles
                .iter()
                .map(|a| {
                    a.sentiment_enriched_at
                        .map(|ts| ts.and_utc().timestamp_micros())
                })
                .collect::<Vec<_>>(),
        )),
    ];

    RecordBatch::try_new(Arc::new(article_schema()), columns)
        .context("Failed to create articles record batch")
}

/// Write a record batch as CSV with a header row. Nulls become empty fields.
pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .with_context(|| format!("Failed to write CSV file: {:?}", path))?;
    Ok(())
}

/// Write events as JSON Lines, one GA4-shaped object per line.
pub fn write_events_jsonl(path: &Path, events: &[Event]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create events file: {:?}", path))?;
    let mut out = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut out, event)
            .with_context(|| format!("Failed to serialize event to {:?}", path))?;
        out.write_all(b"\n")
            .with_context(|| format!("Failed to write events file: {:?}", path))?;
    }
    out.flush()
        .with_context(|| format!("Failed to flush events file: {:?}", path))?;
    Ok(())
}

/// Write `writers.csv`, `articles.csv` and `events.jsonl` into `output_dir`,
/// creating the directory if needed.
pub fn save_dataset(output_dir: &Path, dataset: &Dataset) -> Result<ExportedFiles> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let files = ExportedFiles {
        writers: output_dir.join(WRITERS_FILE),
        articles: output_dir.join(ARTICLES_FILE),
        events: output_dir.join(EVENTS_FILE),
    };

    write_csv(&files.writers, &writers_to_batch(&dataset.writers)?)?;
    info!(path = ?files.writers, rows = dataset.writers.len(), "Saved writers");

    write_csv(&files.articles, &articles_to_batch(&dataset.articles)?)?;
    info!(path = ?files.articles, rows = dataset.articles.len(), "Saved articles");

    write_events_jsonl(&files.events, &dataset.events)?;
    info!(path = ?files.events, rows = dataset.events.len(), "Saved events");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetConfig, EventConfig};
    use crate::dataset::DatasetGenerator;
    use crate::rng::seeded_rng;
    use arrow::array::Array;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn small_dataset() -> Dataset {
        let config = DatasetConfig {
            num_writers: 3,
            num_articles: 20,
            target_events: 300,
            events: EventConfig {
                visitor_pool_size: 50,
                ..Default::default()
            },
            ..Default::default()
        };
        DatasetGenerator::new(&config)
            .generate(&mut seeded_rng(5))
            .unwrap()
    }

    #[test]
    fn test_dates_stored_as_days_since_epoch() {
        let dataset = small_dataset();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

        let writers = writers_to_batch(&dataset.writers).unwrap();
        let tenure = writers
            .column(3)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        for (i, writer) in dataset.writers.iter().enumerate() {
            let days = (writer.tenure_start_date - epoch).num_days();
            assert_eq!(tenure.value(i) as i64, days);
        }

        let articles = articles_to_batch(&dataset.articles).unwrap();
        let published = articles
            .column(3)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        let first = &dataset.articles[0];
        assert_eq!(
            published.value(0) as i64,
            (first.publish_date - epoch).num_days()
        );
        assert_eq!(
            published.value_as_date(0),
            Some(first.publish_date)
        );
    }

    #[test]
    fn test_batches_have_one_row_per_record() {
        let dataset = small_dataset();
        let writers = writers_to_batch(&dataset.writers).unwrap();
        let articles = articles_to_batch(&dataset.articles).unwrap();

        assert_eq!(writers.num_rows(), 3);
        assert_eq!(writers.num_columns(), 6);
        assert_eq!(articles.num_rows(), 20);
        assert_eq!(articles.num_columns(), 12);
        assert_eq!(articles.column(10).null_count(), 20);
    }

    #[test]
    fn test_save_dataset_writes_all_files() {
        let dataset = small_dataset();
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("data");

        let files = save_dataset(&out, &dataset).unwrap();

        let writers_csv = fs::read_to_string(&files.writers).unwrap();
        let mut lines = writers_csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "writer_id,writer_name,primary_category,tenure_start_date,contract_type,target_articles_per_month"
        );
        assert_eq!(lines.count(), 3);
        assert!(writers_csv.contains("writer_001,"));

        let articles_csv = fs::read_to_string(&files.articles).unwrap();
        let header = articles_csv.lines().next().unwrap();
        assert!(header.starts_with("article_id,title,writer_id,publish_date"));
        assert!(header.ends_with("sentiment_label,sentiment_enriched_at"));
        assert_eq!(articles_csv.lines().count(), 21);

        let events_jsonl = fs::read_to_string(&files.events).unwrap();
        assert_eq!(events_jsonl.lines().count(), dataset.events.len());
        let first: Event = serde_json::from_str(events_jsonl.lines().next().unwrap()).unwrap();
        assert_eq!(first, dataset.events[0]);
    }

    #[test]
    fn test_event_json_shape() {
        let dataset = small_dataset();
        let value = serde_json::to_value(&dataset.events[0]).unwrap();

        assert!(value["event_timestamp"].is_i64());
        assert_eq!(value["event_date"].as_str().unwrap().len(), 8);
        assert_eq!(value["event_params"][0]["key"], "article_id");
        assert!(value["event_params"][0]["value"]["string_value"].is_string());
        assert!(value["device"]["category"].is_string());
        assert!(value["geo"]["country"].is_string());
        assert!(value["traffic_source"]["medium"].is_string());
    }
}
