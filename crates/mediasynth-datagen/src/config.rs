//! Distributional parameters for dataset generation.
//!
//! A [`DatasetConfig`] is an immutable value passed by reference into every
//! generator. All fields have defaults, so a YAML file only needs to name the
//! parameters it overrides.

use crate::error::ConfigError;
use crate::model::{DeviceCategory, EventName};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// First day of the observed range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the observed range (inclusive).
    pub end_date: NaiveDate,
    pub num_writers: usize,
    pub num_articles: usize,
    /// Requested number of prospective events; the emitted count may be lower.
    pub target_events: usize,
    pub categories: Vec<String>,
    pub writers: WriterConfig,
    pub articles: ArticleConfig,
    pub events: EventConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            start_date: ymd(2024, 10, 1),
            end_date: ymd(2025, 1, 7),
            num_writers: 75,
            num_articles: 5000,
            target_events: 500_000,
            categories: strings(&["sports", "finance", "lifestyle", "news", "opinion"]),
            writers: WriterConfig::default(),
            articles: ArticleConfig::default(),
            events: EventConfig::default(),
        }
    }
}

/// A value with a relative selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weighted<T> {
    pub value: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(value: T, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Writer population parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub contract_types: Vec<ContractType>,
    /// Tenure start is a uniform (year, month) with the year in this inclusive window.
    pub tenure_start_year: i32,
    pub tenure_end_year: i32,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            contract_types: vec![
                ContractType::new("staff", 0.5, 15, 50),
                ContractType::new("freelance", 0.3, 5, 20),
                ContractType::new("contractor", 0.2, 5, 20),
            ],
            tenure_start_year: 2020,
            tenure_end_year: 2024,
            first_names: strings(&[
                "James", "Sarah", "Michael", "Emily", "David", "Jessica", "Robert", "Amanda",
                "John", "Lisa", "William", "Jennifer", "Richard", "Maria", "Thomas",
            ]),
            last_names: strings(&[
                "Smith",
                "Johnson",
                "Williams",
                "Brown",
                "Jones",
                "Garcia",
                "Miller",
                "Davis",
                "Rodriguez",
                "Martinez",
                "Hernandez",
                "Lopez",
                "Wilson",
                "Anderson",
                "Taylor",
            ]),
        }
    }
}

/// A contract classification with its population weight and the inclusive
/// range of its monthly article target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractType {
    pub name: String,
    pub weight: f64,
    pub min_monthly_target: u32,
    pub max_monthly_target: u32,
}

impl ContractType {
    pub fn new(name: &str, weight: f64, min: u32, max: u32) -> Self {
        Self {
            name: name.to_string(),
            weight,
            min_monthly_target: min,
            max_monthly_target: max,
        }
    }
}

/// Inclusive revenue-per-mille range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpmRange {
    pub min: f64,
    pub max: f64,
}

const STANDARD_RPM: RpmRange = RpmRange { min: 1.5, max: 7.5 };
const PREMIUM_RPM: RpmRange = RpmRange {
    min: 8.0,
    max: 15.0,
};

/// An RPM range as written in YAML, where either bound may be omitted.
#[derive(Deserialize)]
struct PartialRpmRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl PartialRpmRange {
    fn over(self, base: RpmRange) -> RpmRange {
        RpmRange {
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
        }
    }
}

fn standard_rpm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RpmRange, D::Error> {
    PartialRpmRange::deserialize(deserializer).map(|partial| partial.over(STANDARD_RPM))
}

fn premium_rpm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RpmRange, D::Error> {
    PartialRpmRange::deserialize(deserializer).map(|partial| partial.over(PREMIUM_RPM))
}

/// Article corpus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    /// Probability that an article takes its writer's primary category.
    pub category_inheritance_prob: f64,
    pub min_word_count: u32,
    pub max_word_count: u32,
    pub premium_prob: f64,
    /// Either bound may be omitted in YAML and keeps its default.
    #[serde(deserialize_with = "standard_rpm")]
    pub standard_rpm: RpmRange,
    #[serde(deserialize_with = "premium_rpm")]
    pub premium_rpm: RpmRange,
    /// Publish offsets are Exp(divisor / span) days back from the end date.
    pub recency_divisor: f64,
    /// Title templates keyed by category, with `{slot}` placeholders.
    pub title_templates: BTreeMap<String, Vec<String>>,
    /// Used for categories without their own templates.
    pub fallback_templates: Vec<String>,
    /// Candidate values for each placeholder name.
    pub title_slots: BTreeMap<String, Vec<String>>,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        let mut title_templates = BTreeMap::new();
        title_templates.insert(
            "sports".to_string(),
            strings(&[
                "{team} Dominates {opponent} in Playoff Showdown",
                "Breaking: {player} Signs Record-Breaking Contract",
                "{sport} Season Preview: Top Contenders and Dark Horses",
                "Analysis: Why {team}'s Strategy Could Win the Championship",
            ]),
        );
        title_templates.insert(
            "finance".to_string(),
            strings(&[
                "{company} Stock Soars {percent}% on Earnings Beat",
                "Market Analysis: {sector} Sector Outlook for {year}",
                "Fed Decision: What {rate} Rate Change Means for Investors",
                "{company} CEO Discusses Growth Strategy and Market Position",
            ]),
        );
        title_templates.insert(
            "lifestyle".to_string(),
            strings(&[
                "The Ultimate Guide to {topic} in {year}",
                "{number} Ways to Improve Your {area} This {season}",
                "Trending Now: {trend} Takes Over Social Media",
                "Expert Tips: How to Master {skill} in {timeframe}",
            ]),
        );
        title_templates.insert(
            "news".to_string(),
            strings(&[
                "Breaking: {event} Unfolds in {location}",
                "{topic} Update: What You Need to Know Today",
                "Analysis: The Impact of {event} on {sector}",
                "{location} Residents React to {event}",
            ]),
        );
        title_templates.insert(
            "opinion".to_string(),
            strings(&[
                "Why {topic} Matters More Than Ever in {year}",
                "The Case for {position} in Today's {context}",
                "Unpopular Opinion: {statement}",
                "Commentary: {topic} and Its Implications for {audience}",
            ]),
        );

        let mut title_slots = BTreeMap::new();
        let slots: &[(&str, &[&str])] = &[
            ("team", &["Lakers", "Yankees", "Patriots", "Warriors"]),
            ("opponent", &["Celtics", "Red Sox", "Chiefs", "Mavericks"]),
            ("player", &["LeBron", "Judge", "Mahomes", "Curry"]),
            ("sport", &["NFL", "NBA", "MLB", "NHL"]),
            ("company", &["Tesla", "Apple", "Amazon", "Microsoft"]),
            ("sector", &["Tech", "Energy", "Healthcare", "Finance"]),
            ("year", &["2025", "2026"]),
            ("rate", &["Interest", "Inflation", "Growth"]),
            ("topic", &["Travel", "Wellness", "Technology", "Housing"]),
            ("number", &["5", "7", "10", "15"]),
            ("area", &["Health", "Career", "Relationships", "Finances"]),
            ("season", &["Spring", "Summer", "Fall", "Winter"]),
            (
                "trend",
                &["Minimalism", "Plant-Based Eating", "Remote Work", "Mindfulness"],
            ),
            ("skill", &["Cooking", "Investing", "Photography", "Coding"]),
            ("timeframe", &["30 Days", "3 Months", "This Year"]),
            (
                "event",
                &["Summit", "Policy Change", "Economic Shift", "Crisis"],
            ),
            ("location", &["New York", "California", "Texas", "Florida"]),
            ("position", &["Reform", "Innovation", "Change", "Action"]),
            ("context", &["Economy", "Society", "Politics", "World"]),
            (
                "statement",
                &[
                    "We Need More Regulation",
                    "Markets Are Efficient",
                    "Change is Overdue",
                ],
            ),
            (
                "audience",
                &["Consumers", "Businesses", "Investors", "Society"],
            ),
        ];
        for (name, values) in slots {
            title_slots.insert(name.to_string(), strings(values));
        }
        title_slots.insert(
            "percent".to_string(),
            (5..=25).map(|p: u32| p.to_string()).collect(),
        );

        Self {
            category_inheritance_prob: 0.70,
            min_word_count: 300,
            max_word_count: 3000,
            premium_prob: 0.20,
            standard_rpm: STANDARD_RPM,
            premium_rpm: PREMIUM_RPM,
            recency_divisor: 3.0,
            title_templates,
            fallback_templates: strings(&[
                "{topic} Update: What You Need to Know Today",
                "Analysis: The Impact of {event} on {sector}",
            ]),
            title_slots,
        }
    }
}

/// Per-device OS and browser tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub category: DeviceCategory,
    pub weight: f64,
    pub operating_systems: Vec<String>,
    pub browsers: Vec<String>,
}

/// A (source, medium) traffic pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSourceWeight {
    pub source: String,
    pub medium: String,
    pub weight: f64,
}

impl TrafficSourceWeight {
    pub fn new(source: &str, medium: &str, weight: f64) -> Self {
        Self {
            source: source.to_string(),
            medium: medium.to_string(),
            weight,
        }
    }
}

/// Engagement duration: `clamp(LogNormal(mu, sigma) * scale_ms, min_ms, max_ms)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub mu: f64,
    pub sigma: f64,
    pub scale_ms: f64,
    pub min_ms: i64,
    pub max_ms: i64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            mu: 4.5,
            sigma: 0.8,
            scale_ms: 1000.0,
            min_ms: 5_000,
            max_ms: 300_000,
        }
    }
}

/// Article sampling weight: `max(floor, peak * decay^age_days)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyConfig {
    pub peak_weight: f64,
    pub daily_decay: f64,
    pub floor_weight: f64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            peak_weight: 100.0,
            daily_decay: 0.95,
            floor_weight: 1.0,
        }
    }
}

/// Event stream parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Number of pseudonymous visitor IDs events are drawn from.
    pub visitor_pool_size: usize,
    pub event_types: Vec<Weighted<EventName>>,
    pub devices: Vec<DeviceProfile>,
    pub countries: Vec<Weighted<String>>,
    /// Only this country gets region and city attributes.
    pub dominant_country: String,
    pub regions: Vec<String>,
    pub cities: BTreeMap<String, Vec<String>>,
    /// City used for regions without a city list.
    pub unknown_city: String,
    /// Relative traffic for each hour of the day, index 0 = midnight.
    pub hour_weights: Vec<f64>,
    pub traffic_sources: Vec<TrafficSourceWeight>,
    /// Mediums that carry a campaign identifier.
    pub campaign_mediums: Vec<String>,
    /// Campaign indices are drawn from `1..=campaigns_per_medium`.
    pub campaigns_per_medium: u32,
    pub scroll_milestones: Vec<Weighted<i64>>,
    pub engagement: EngagementConfig,
    pub recency: RecencyConfig,
    /// Base URL for synthesized page locations.
    pub site_url: String,
}

impl Default for EventConfig {
    fn default() -> Self {
        let mut cities = BTreeMap::new();
        cities.insert(
            "NY".to_string(),
            strings(&["New York", "Buffalo", "Rochester"]),
        );
        cities.insert(
            "CA".to_string(),
            strings(&["Los Angeles", "San Francisco", "San Diego"]),
        );
        cities.insert("TX".to_string(), strings(&["Houston", "Dallas", "Austin"]));

        Self {
            visitor_pool_size: 50_000,
            event_types: vec![
                Weighted::new(EventName::PageView, 80.0),
                Weighted::new(EventName::Scroll, 5.0),
                Weighted::new(EventName::UserEngagement, 10.0),
                Weighted::new(EventName::Click, 3.0),
                Weighted::new(EventName::ViewItem, 2.0),
            ],
            devices: vec![
                DeviceProfile {
                    category: DeviceCategory::Desktop,
                    weight: 45.0,
                    operating_systems: strings(&["Windows", "macOS", "Linux"]),
                    browsers: strings(&["Chrome", "Firefox", "Edge", "Safari"]),
                },
                DeviceProfile {
                    category: DeviceCategory::Mobile,
                    weight: 50.0,
                    operating_systems: strings(&["iOS", "Android"]),
                    browsers: strings(&["Chrome", "Safari"]),
                },
                DeviceProfile {
                    category: DeviceCategory::Tablet,
                    weight: 5.0,
                    operating_systems: strings(&["iOS", "Android"]),
                    browsers: strings(&["Safari", "Chrome"]),
                },
            ],
            countries: vec![
                Weighted::new("US".to_string(), 85.0),
                Weighted::new("CA".to_string(), 5.0),
                Weighted::new("GB".to_string(), 5.0),
                Weighted::new("AU".to_string(), 5.0),
            ],
            dominant_country: "US".to_string(),
            regions: strings(&["NY", "CA", "TX", "FL", "IL", "PA", "OH", "GA", "NC", "MI"]),
            cities,
            unknown_city: "Unknown".to_string(),
            hour_weights: vec![
                2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 5.0, 7.0, 8.0, 9.0, 9.0, 9.0, 8.0, 8.0, 8.0,
                9.0, 10.0, 10.0, 9.0, 8.0, 6.0, 4.0, 3.0,
            ],
            traffic_sources: vec![
                TrafficSourceWeight::new("google", "organic", 40.0),
                TrafficSourceWeight::new("facebook", "social", 15.0),
                TrafficSourceWeight::new("twitter", "social", 10.0),
                TrafficSourceWeight::new("direct", "none", 20.0),
                TrafficSourceWeight::new("newsletter", "email", 10.0),
                TrafficSourceWeight::new("bing", "organic", 5.0),
            ],
            campaign_mediums: strings(&["social", "email"]),
            campaigns_per_medium: 5,
            scroll_milestones: vec![
                Weighted::new(25, 10.0),
                Weighted::new(50, 20.0),
                Weighted::new(75, 30.0),
                Weighted::new(90, 25.0),
                Weighted::new(100, 15.0),
            ],
            engagement: EngagementConfig::default(),
            recency: RecencyConfig::default(),
            site_url: "https://example-media.com".to_string(),
        }
    }
}

impl EventConfig {
    /// Look up the OS/browser tables for a device category.
    pub fn device(&self, category: DeviceCategory) -> Option<&DeviceProfile> {
        self.devices.iter().find(|d| d.category == category)
    }
}

impl DatasetConfig {
    /// Load a config from a YAML file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of days between start and end date.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Check the preconditions the generators assume.
    ///
    /// The generators do not call this themselves; callers that accept
    /// user-supplied configuration should.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_date < self.start_date {
            return Err(ConfigError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.categories.is_empty() {
            return Err(ConfigError::empty("categories"));
        }
        if self.num_articles > 0 && self.num_writers == 0 {
            return Err(ConfigError::value(
                "num_writers",
                "articles need at least one writer",
            ));
        }
        if self.target_events > 0 && self.num_articles == 0 {
            return Err(ConfigError::value(
                "num_articles",
                "events need at least one article",
            ));
        }

        self.validate_writers()?;
        self.validate_articles()?;
        self.validate_events()
    }

    fn validate_writers(&self) -> Result<(), ConfigError> {
        let writers = &self.writers;
        check_weights(
            "writers.contract_types",
            writers.contract_types.iter().map(|c| c.weight),
        )?;
        for contract in &writers.contract_types {
            if contract.min_monthly_target > contract.max_monthly_target {
                return Err(ConfigError::range(
                    format!("writers.contract_types.{}", contract.name),
                    contract.min_monthly_target,
                    contract.max_monthly_target,
                ));
            }
        }
        if writers.tenure_start_year > writers.tenure_end_year {
            return Err(ConfigError::range(
                "writers.tenure years",
                writers.tenure_start_year,
                writers.tenure_end_year,
            ));
        }
        if writers.first_names.is_empty() {
            return Err(ConfigError::empty("writers.first_names"));
        }
        if writers.last_names.is_empty() {
            return Err(ConfigError::empty("writers.last_names"));
        }
        Ok(())
    }

    fn validate_articles(&self) -> Result<(), ConfigError> {
        let articles = &self.articles;
        check_probability(
            "articles.category_inheritance_prob",
            articles.category_inheritance_prob,
        )?;
        check_probability("articles.premium_prob", articles.premium_prob)?;
        if articles.min_word_count > articles.max_word_count {
            return Err(ConfigError::range(
                "articles.word_count",
                articles.min_word_count,
                articles.max_word_count,
            ));
        }
        check_rpm("articles.standard_rpm", articles.standard_rpm)?;
        check_rpm("articles.premium_rpm", articles.premium_rpm)?;
        if !(articles.recency_divisor > 0.0 && articles.recency_divisor.is_finite()) {
            return Err(ConfigError::value(
                "articles.recency_divisor",
                "must be positive and finite",
            ));
        }
        if articles.fallback_templates.is_empty() {
            return Err(ConfigError::empty("articles.fallback_templates"));
        }
        Ok(())
    }

    fn validate_events(&self) -> Result<(), ConfigError> {
        let events = &self.events;
        if events.visitor_pool_size == 0 {
            return Err(ConfigError::value(
                "events.visitor_pool_size",
                "must be positive",
            ));
        }
        check_weights(
            "events.event_types",
            events.event_types.iter().map(|e| e.weight),
        )?;
        check_weights("events.devices", events.devices.iter().map(|d| d.weight))?;
        for device in &events.devices {
            if device.operating_systems.is_empty() {
                return Err(ConfigError::empty(format!(
                    "events.devices.{}.operating_systems",
                    device.category.as_str()
                )));
            }
            if device.browsers.is_empty() {
                return Err(ConfigError::empty(format!(
                    "events.devices.{}.browsers",
                    device.category.as_str()
                )));
            }
        }
        check_weights("events.countries", events.countries.iter().map(|c| c.weight))?;
        if events.regions.is_empty() {
            return Err(ConfigError::empty("events.regions"));
        }
        if events.hour_weights.len() != 24 {
            return Err(ConfigError::value(
                "events.hour_weights",
                format!("expected 24 weights, got {}", events.hour_weights.len()),
            ));
        }
        check_weights("events.hour_weights", events.hour_weights.iter().copied())?;
        check_weights(
            "events.traffic_sources",
            events.traffic_sources.iter().map(|t| t.weight),
        )?;
        if events.campaigns_per_medium == 0 {
            return Err(ConfigError::value(
                "events.campaigns_per_medium",
                "must be at least 1",
            ));
        }
        check_weights(
            "events.scroll_milestones",
            events.scroll_milestones.iter().map(|s| s.weight),
        )?;

        let engagement = &events.engagement;
        if engagement.min_ms > engagement.max_ms {
            return Err(ConfigError::range(
                "events.engagement",
                engagement.min_ms,
                engagement.max_ms,
            ));
        }
        if !(engagement.sigma >= 0.0 && engagement.sigma.is_finite()) {
            return Err(ConfigError::value(
                "events.engagement.sigma",
                "must be non-negative and finite",
            ));
        }

        let recency = &events.recency;
        if !(recency.floor_weight > 0.0 && recency.peak_weight > 0.0) {
            return Err(ConfigError::value(
                "events.recency",
                "weights must be positive",
            ));
        }
        if !(recency.daily_decay > 0.0 && recency.daily_decay <= 1.0) {
            return Err(ConfigError::value(
                "events.recency.daily_decay",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

fn check_weights(table: &str, weights: impl Iterator<Item = f64>) -> Result<(), ConfigError> {
    let mut total = 0.0;
    let mut count = 0;
    for weight in weights {
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(ConfigError::weights(table, format!("bad weight {}", weight)));
        }
        total += weight;
        count += 1;
    }
    if count == 0 {
        return Err(ConfigError::empty(table));
    }
    if total <= 0.0 {
        return Err(ConfigError::weights(table, "all weights are zero"));
    }
    Ok(())
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability {
            field: field.to_string(),
            value,
        })
    }
}

fn check_rpm(field: &str, range: RpmRange) -> Result<(), ConfigError> {
    if range.min.is_finite() && range.max.is_finite() && range.min <= range.max {
        Ok(())
    } else {
        Err(ConfigError::range(field, range.min, range.max))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = DatasetConfig::default();
        config.validate().unwrap();
        assert_eq!(config.span_days(), 98);
        assert_eq!(config.events.hour_weights.len(), 24);
        assert_eq!(config.categories.len(), 5);
    }

    #[test]
    fn test_every_default_category_has_templates() {
        let config = DatasetConfig::default();
        for category in &config.categories {
            let templates = config.articles.title_templates.get(category).unwrap();
            assert_eq!(templates.len(), 4, "category {}", category);
        }
    }

    #[test]
    fn test_device_lookup() {
        let config = EventConfig::default();
        let tablet = config.device(DeviceCategory::Tablet).unwrap();
        assert!(tablet
            .operating_systems
            .iter()
            .all(|os| os == "iOS" || os == "Android"));
    }

    #[test]
    fn test_rejects_inverted_date_range() {
        let config = DatasetConfig {
            start_date: ymd(2025, 1, 7),
            end_date: ymd(2024, 10, 1),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_categories() {
        let config = DatasetConfig {
            categories: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTable(_))));
    }

    #[test]
    fn test_rejects_bad_hour_weights() {
        let mut config = DatasetConfig::default();
        config.events.hour_weights.pop();
        assert!(config.validate().is_err());

        let mut config = DatasetConfig::default();
        config.events.hour_weights = vec![0.0; 24];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = DatasetConfig::default();
        config.articles.premium_prob = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_yaml_overrides_merge_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "start_date: 2024-06-01\nend_date: 2024-06-07\nnum_writers: 2\nevents:\n  visitor_pool_size: 10\n  dominant_country: CA"
        )
        .unwrap();

        let config = DatasetConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.start_date, ymd(2024, 6, 1));
        assert_eq!(config.span_days(), 6);
        assert_eq!(config.num_writers, 2);
        assert_eq!(config.events.visitor_pool_size, 10);
        assert_eq!(config.events.dominant_country, "CA");
        // Untouched sections keep their defaults
        assert_eq!(config.num_articles, 5000);
        assert_eq!(config.events.event_types.len(), 5);
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_overrides_single_nested_fields() {
        let config: DatasetConfig = serde_yaml::from_str(
            "events:\n  recency:\n    daily_decay: 0.9\n  engagement:\n    sigma: 0.5\narticles:\n  premium_rpm:\n    max: 20.0\n  standard_rpm:\n    min: 2.0\n",
        )
        .unwrap();

        assert_eq!(config.events.recency.daily_decay, 0.9);
        assert_eq!(config.events.recency.peak_weight, 100.0);
        assert_eq!(config.events.recency.floor_weight, 1.0);
        assert_eq!(config.events.engagement.sigma, 0.5);
        assert_eq!(config.events.engagement.mu, 4.5);
        assert_eq!(config.events.engagement.max_ms, 300_000);
        assert_eq!(config.articles.premium_rpm, RpmRange { min: 8.0, max: 20.0 });
        assert_eq!(config.articles.standard_rpm, RpmRange { min: 2.0, max: 7.5 });
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = DatasetConfig::from_yaml_file(Path::new("/nonexistent/mediasynth.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
