//! Record types for the three populations.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A writer on staff or under contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Writer {
    pub writer_id: String,
    pub writer_name: String,
    pub primary_category: String,
    pub tenure_start_date: NaiveDate,
    pub contract_type: String,
    pub target_articles_per_month: u32,
}

/// A published article.
///
/// The sentiment fields are always `None` when generated; only the
/// enrichment job fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    pub writer_id: String,
    pub publish_date: NaiveDate,
    pub category: String,
    pub word_count: u32,
    pub is_premium: bool,
    pub estimated_rpm: f64,
    pub sentiment_score_positive: Option<f64>,
    pub sentiment_score_negative: Option<f64>,
    pub sentiment_label: Option<String>,
    pub sentiment_enriched_at: Option<NaiveDateTime>,
}

/// Event type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    PageView,
    Scroll,
    UserEngagement,
    Click,
    ViewItem,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::PageView => "page_view",
            EventName::Scroll => "scroll",
            EventName::UserEngagement => "user_engagement",
            EventName::Click => "click",
            EventName::ViewItem => "view_item",
        }
    }
}

/// Device category. Each category has its own OS and browser tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Desktop => "desktop",
            DeviceCategory::Mobile => "mobile",
            DeviceCategory::Tablet => "tablet",
        }
    }
}

/// A typed event parameter value, serialized GA4-style as
/// `{"string_value": ...}` or `{"int_value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    #[serde(rename = "string_value")]
    String(String),
    #[serde(rename = "int_value")]
    Int(i64),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::String(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParam {
    pub key: String,
    pub value: ParamValue,
}

impl EventParam {
    pub fn string(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: ParamValue::String(value.into()),
        }
    }

    pub fn int(key: &str, value: i64) -> Self {
        Self {
            key: key.to_string(),
            value: ParamValue::Int(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub category: DeviceCategory,
    pub operating_system: String,
    pub browser: String,
}

/// Region and city are empty strings outside the dominant country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub country: String,
    pub region: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
}

/// One visitor interaction, in GA4 export shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Calendar date as `YYYYMMDD`.
    pub event_date: String,
    /// Microseconds since the Unix epoch.
    pub event_timestamp: i64,
    pub event_name: EventName,
    pub user_pseudo_id: String,
    pub ga_session_id: String,
    pub event_params: Vec<EventParam>,
    pub device: Device,
    pub geo: Geo,
    pub traffic_source: TrafficSource,
}

impl Event {
    /// Look up a parameter by key.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.event_params
            .iter()
            .find(|p| p.key == key)
            .map(|p| &p.value)
    }

    /// The referenced article.
    pub fn article_id(&self) -> Option<&str> {
        self.param("article_id").and_then(ParamValue::as_str)
    }

    /// Calendar date derived from the high-resolution timestamp.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_micros(self.event_timestamp).map(|dt| dt.date_naive())
    }
}
