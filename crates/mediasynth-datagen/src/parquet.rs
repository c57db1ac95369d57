//! Parquet writer for events with Hive-style partitioning by event date.

use crate::model::Event;
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Directory under the output root that holds the partitions.
pub const EVENTS_DIR: &str = "events";

/// Flattened event columns (without event_date, which is the partition key).
fn event_schema() -> Schema {
    Schema::new(vec![
        Field::new("event_timestamp", DataType::Int64, false),
        Field::new("event_name", DataType::Utf8, false),
        Field::new("user_pseudo_id", DataType::Utf8, false),
        Field::new("ga_session_id", DataType::Utf8, false),
        Field::new("article_id", DataType::Utf8, true),
        Field::new("event_params", DataType::Utf8, false),
        Field::new("device_category", DataType::Utf8, false),
        Field::new("device_operating_system", DataType::Utf8, false),
        Field::new("device_browser", DataType::Utf8, false),
        Field::new("geo_country", DataType::Utf8, false),
        Field::new("geo_region", DataType::Utf8, false),
        Field::new("geo_city", DataType::Utf8, false),
        Field::new("traffic_source", DataType::Utf8, false),
        Field::new("traffic_medium", DataType::Utf8, false),
        Field::new("traffic_campaign", DataType::Utf8, true),
    ])
}

/// Write one day's events to `events/event_date=YYYYMMDD/data.parquet`.
pub fn write_partition(output_dir: &Path, event_date: &str, events: &[&Event]) -> Result<usize> {
    if events.is_empty() {
        return Ok(0);
    }

    let partition_dir = output_dir
        .join(EVENTS_DIR)
        .join(format!("event_date={}", event_date));
    fs::create_dir_all(&partition_dir)
        .with_context(|| format!("Failed to create partition directory: {:?}", partition_dir))?;

    let file_path = partition_dir.join("data.parquet");
    let file = File::create(&file_path)
        .with_context(|| format!("Failed to create parquet file: {:?}", file_path))?;

    let schema = Arc::new(event_schema());
    let batch = events_to_record_batch(events, &schema)?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .context("Failed to create Parquet writer")?;
    writer
        .write(&batch)
        .context("Failed to write record batch")?;
    writer.close().context("Failed to close Parquet writer")?;

    Ok(events.len())
}

fn events_to_record_batch(events: &[&Event], schema: &Arc<Schema>) -> Result<RecordBatch> {
    let mut names = StringBuilder::new();
    let mut visitors = StringBuilder::new();
    let mut sessions = StringBuilder::new();
    let mut article_ids = StringBuilder::new();
    let mut params = StringBuilder::new();
    let mut device_categories = StringBuilder::new();
    let mut operating_systems = StringBuilder::new();
    let mut browsers = StringBuilder::new();
    let mut countries = StringBuilder::new();
    let mut regions = StringBuilder::new();
    let mut cities = StringBuilder::new();
    let mut sources = StringBuilder::new();
    let mut mediums = StringBuilder::new();
    let mut campaigns = StringBuilder::new();

    for event in events {
        names.append_value(event.event_name.as_str());
        visitors.append_value(&event.user_pseudo_id);
        sessions.append_value(&event.ga_session_id);
        article_ids.append_option(event.article_id());
        params.append_value(
            serde_json::to_string(&event.event_params).context("Failed to serialize params")?,
        );
        device_categories.append_value(event.device.category.as_str());
        operating_systems.append_value(&event.device.operating_system);
        browsers.append_value(&event.device.browser);
        countries.append_value(&event.geo.country);
        regions.append_value(&event.geo.region);
        cities.append_value(&event.geo.city);
        sources.append_value(&event.traffic_source.source);
        mediums.append_value(&event.traffic_source.medium);
        campaigns.append_option(event.traffic_source.campaign.as_deref());
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(
            events.iter().map(|e| e.event_timestamp),
        )),
        Arc::new(names.finish()),
        Arc::new(visitors.finish()),
        Arc::new(sessions.finish()),
        Arc::new(article_ids.finish()),
        Arc::new(params.finish()),
        Arc::new(device_categories.finish()),
        Arc::new(operating_systems.finish()),
        Arc::new(browsers.finish()),
        Arc::new(countries.finish()),
        Arc::new(regions.finish()),
        Arc::new(cities.finish()),
        Arc::new(sources.finish()),
        Arc::new(mediums.finish()),
        Arc::new(campaigns.finish()),
    ];

    RecordBatch::try_new(schema.clone(), columns).context("Failed to create record batch")
}

/// Write events as Hive-partitioned Parquet, one partition per event date,
/// partitions written in parallel. Returns the number of rows written.
///
/// Events within a partition keep their input order.
pub fn write_events_to_parquet(output_dir: &Path, events: &[Event]) -> Result<usize> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut by_date: BTreeMap<&str, Vec<&Event>> = BTreeMap::new();
    for event in events {
        by_date
            .entry(event.event_date.as_str())
            .or_default()
            .push(event);
    }
    let partitions: Vec<_> = by_date.into_iter().collect();

    let total_written = AtomicUsize::new(0);

    partitions
        .par_iter()
        .try_for_each(|(event_date, day_events)| -> Result<()> {
            let count = write_partition(output_dir, event_date, day_events)?;
            let new_total = total_written.fetch_add(count, Ordering::SeqCst) + count;
            debug!(
                event_date = *event_date,
                rows = count,
                written = new_total,
                "Wrote partition"
            );
            Ok(())
        })?;

    Ok(total_written.load(Ordering::SeqCst))
}
