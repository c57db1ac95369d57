//! Visitor event stream.
//!
//! Generation runs in four steps:
//!
//! 1. Weight every article by recency: `max(floor, peak * decay^age_days)`.
//! 2. Pre-sample every per-event dimension (event type, article, visitor,
//!    device, country, hour, day offset, traffic pair) as one batch each.
//! 3. Assemble each prospective event. An event dated before its article's
//!    publish date is discarded and counted, never repaired.
//! 4. Sort the survivors by timestamp.
//!
//! The emitted count is therefore at most the requested count; callers that
//! need an exact count must over-request.

use crate::articles::age_days;
use crate::config::{DatasetConfig, DeviceProfile, EventConfig, RecencyConfig, TrafficSourceWeight};
use crate::error::ConfigError;
use crate::gen::Gen;
use crate::generators::{ClampedLogNormal, OneOf, Uniform, WeightedChoice};
use crate::model::{Article, Device, Event, EventName, EventParam, Geo, TrafficSource};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::{debug, info};

/// How often the assembly loop reports progress.
const PROGRESS_INTERVAL: usize = 50_000;

const VISITOR_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const VISITOR_SUFFIX_LEN: usize = 10;

/// Surviving events plus the number of prospective events discarded for
/// predating their article.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    pub events: Vec<Event>,
    pub discarded: usize,
}

/// Recency weight for each article, in corpus order.
pub fn recency_weights(
    articles: &[Article],
    range_end: NaiveDate,
    recency: &RecencyConfig,
) -> Vec<f64> {
    articles
        .iter()
        .map(|article| {
            let age = age_days(article.publish_date, range_end) as f64;
            (recency.peak_weight * recency.daily_decay.powf(age)).max(recency.floor_weight)
        })
        .collect()
}

/// Build the pool of pseudonymous visitor IDs.
///
/// Each ID is `"{first_seen_epoch_seconds}.{10 lowercase alphanumerics}"`,
/// with the first-seen second drawn from inside the configured range.
pub fn visitor_pool(
    config: &DatasetConfig,
    size: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<String>, ConfigError> {
    let first = config.start_date.and_time(NaiveTime::MIN).and_utc().timestamp();
    let last = (config.end_date.and_time(NaiveTime::MIN) + Duration::days(1))
        .and_utc()
        .timestamp()
        - 1;
    let first_seen_gen = Uniform::new("visitor first-seen range", first, last)?;

    Ok((0..size)
        .map(|_| {
            let first_seen = first_seen_gen.generate(rng);
            let suffix: String = (0..VISITOR_SUFFIX_LEN)
                .map(|_| {
                    let idx = rng.gen_range(0..VISITOR_SUFFIX_ALPHABET.len());
                    VISITOR_SUFFIX_ALPHABET[idx] as char
                })
                .collect();
            format!("{}.{}", first_seen, suffix)
        })
        .collect())
}

/// Session key: the event's epoch second plus a random 7-digit suffix.
pub fn session_id(timestamp: &NaiveDateTime, rng: &mut dyn RngCore) -> String {
    let suffix: u32 = rng.gen_range(1_000_000..=9_999_999);
    format!("{}.{}", timestamp.and_utc().timestamp(), suffix)
}

/// Generate up to `target` events over `articles`.
pub fn generate_events(
    config: &DatasetConfig,
    target: usize,
    articles: &[Article],
    rng: &mut dyn RngCore,
) -> Result<EventStream, ConfigError> {
    if target == 0 {
        return Ok(EventStream {
            events: Vec::new(),
            discarded: 0,
        });
    }
    if articles.is_empty() {
        return Err(ConfigError::empty("article corpus"));
    }

    let params = &config.events;
    let samplers = Samplers::new(config, articles)?;
    let assembler = EventAssembler::new(params)?;

    info!(requested = target, "Creating visitor pool");
    let visitors = visitor_pool(config, params.visitor_pool_size, rng)?;
    let visitor_gen = OneOf::new("visitor pool", (0..visitors.len()).collect())?;

    info!(requested = target, "Pre-sampling event dimensions");
    let event_names = samplers.event_type.generate_n(rng, target);
    let article_indices = samplers.article.generate_n(rng, target);
    let visitor_indices = visitor_gen.generate_n(rng, target);
    let devices = samplers.device.generate_n(rng, target);
    let countries = samplers.country.generate_n(rng, target);
    let hours = samplers.hour.generate_n(rng, target);
    let day_offsets = samplers.day_offset.generate_n(rng, target);
    let traffic = samplers.traffic.generate_n(rng, target);

    let mut events = Vec::with_capacity(target);
    let mut discarded = 0;

    for i in 0..target {
        if i > 0 && i % PROGRESS_INTERVAL == 0 {
            debug!(
                processed = i,
                requested = target,
                kept = events.len(),
                discarded,
                "Event generation progress"
            );
        }

        let article = &articles[article_indices[i]];
        let event_day = config.start_date + Duration::days(day_offsets[i]);
        let timestamp = assemble_timestamp(event_day, hours[i], rng);

        if event_day < article.publish_date {
            discarded += 1;
            continue;
        }

        events.push(assembler.assemble(
            event_names[i],
            article,
            &visitors[visitor_indices[i]],
            devices[i],
            &countries[i],
            traffic[i],
            &timestamp,
            rng,
        ));
    }

    info!(
        kept = events.len(),
        discarded, "Generated events, sorting by timestamp"
    );
    events.sort_by_key(|e| e.event_timestamp);

    Ok(EventStream { events, discarded })
}

/// Combine a day and hour with uniformly drawn minute, second and microsecond.
fn assemble_timestamp(day: NaiveDate, hour: u32, rng: &mut dyn RngCore) -> NaiveDateTime {
    let minute = rng.gen_range(0..60i64);
    let second = rng.gen_range(0..60i64);
    let micros = rng.gen_range(0..1_000_000i64);
    day.and_time(NaiveTime::MIN)
        + Duration::hours(hour as i64)
        + Duration::minutes(minute)
        + Duration::seconds(second)
        + Duration::microseconds(micros)
}

/// Weighted tables for the pre-sampled dimensions.
struct Samplers<'a> {
    event_type: WeightedChoice<EventName>,
    article: WeightedChoice<usize>,
    device: WeightedChoice<&'a DeviceProfile>,
    country: WeightedChoice<String>,
    hour: WeightedChoice<u32>,
    day_offset: Uniform<i64>,
    traffic: WeightedChoice<&'a TrafficSourceWeight>,
}

impl<'a> Samplers<'a> {
    fn new(config: &'a DatasetConfig, articles: &[Article]) -> Result<Self, ConfigError> {
        let params = &config.events;
        let weights = recency_weights(articles, config.end_date, &params.recency);

        Ok(Self {
            event_type: WeightedChoice::new(
                "events.event_types",
                params
                    .event_types
                    .iter()
                    .map(|e| (e.value, e.weight))
                    .collect(),
            )?,
            article: WeightedChoice::new(
                "article recency weights",
                weights.into_iter().enumerate().collect(),
            )?,
            device: WeightedChoice::new(
                "events.devices",
                params.devices.iter().map(|d| (d, d.weight)).collect(),
            )?,
            country: WeightedChoice::new(
                "events.countries",
                params
                    .countries
                    .iter()
                    .map(|c| (c.value.clone(), c.weight))
                    .collect(),
            )?,
            hour: WeightedChoice::new(
                "events.hour_weights",
                params
                    .hour_weights
                    .iter()
                    .enumerate()
                    .map(|(hour, weight)| (hour as u32, *weight))
                    .collect(),
            )?,
            day_offset: Uniform::new("date range", 0, config.span_days())?,
            traffic: WeightedChoice::new(
                "events.traffic_sources",
                params
                    .traffic_sources
                    .iter()
                    .map(|t| (t, t.weight))
                    .collect(),
            )?,
        })
    }
}

/// Per-event derivations that depend on already-chosen dimensions.
struct EventAssembler<'a> {
    params: &'a EventConfig,
    scroll: WeightedChoice<i64>,
    engagement: ClampedLogNormal,
}

impl<'a> EventAssembler<'a> {
    fn new(params: &'a EventConfig) -> Result<Self, ConfigError> {
        let engagement = &params.engagement;
        Ok(Self {
            params,
            scroll: WeightedChoice::new(
                "events.scroll_milestones",
                params
                    .scroll_milestones
                    .iter()
                    .map(|s| (s.value, s.weight))
                    .collect(),
            )?,
            engagement: ClampedLogNormal::new(
                "events.engagement",
                engagement.mu,
                engagement.sigma,
                engagement.scale_ms,
                engagement.min_ms,
                engagement.max_ms,
            )?,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        event_name: EventName,
        article: &Article,
        visitor: &str,
        device: &DeviceProfile,
        country: &str,
        traffic: &TrafficSourceWeight,
        timestamp: &NaiveDateTime,
        rng: &mut dyn RngCore,
    ) -> Event {
        let event_timestamp = timestamp.and_utc().timestamp_micros();
        let ga_session_id = session_id(timestamp, rng);

        Event {
            event_date: timestamp.format("%Y%m%d").to_string(),
            event_timestamp,
            event_name,
            user_pseudo_id: visitor.to_string(),
            ga_session_id,
            device: self.device(device, rng),
            geo: self.geo(country, rng),
            traffic_source: self.traffic_source(traffic, rng),
            event_params: self.params(event_name, article, rng),
        }
    }

    fn device(&self, profile: &DeviceProfile, rng: &mut dyn RngCore) -> Device {
        Device {
            category: profile.category,
            operating_system: pick(&profile.operating_systems, rng),
            browser: pick(&profile.browsers, rng),
        }
    }

    fn geo(&self, country: &str, rng: &mut dyn RngCore) -> Geo {
        if country != self.params.dominant_country {
            return Geo {
                country: country.to_string(),
                region: String::new(),
                city: String::new(),
            };
        }

        let region = pick(&self.params.regions, rng);
        let city = self
            .params
            .cities
            .get(&region)
            .and_then(|cities| cities.choose(rng))
            .cloned()
            .unwrap_or_else(|| self.params.unknown_city.clone());

        Geo {
            country: country.to_string(),
            region,
            city,
        }
    }

    fn traffic_source(&self, traffic: &TrafficSourceWeight, rng: &mut dyn RngCore) -> TrafficSource {
        let campaign = if self.params.campaign_mediums.contains(&traffic.medium) {
            let index = rng.gen_range(1..=self.params.campaigns_per_medium.max(1));
            Some(format!("{}_campaign_{}", traffic.medium, index))
        } else {
            None
        };

        TrafficSource {
            source: traffic.source.clone(),
            medium: traffic.medium.clone(),
            campaign,
        }
    }

    fn params(
        &self,
        event_name: EventName,
        article: &Article,
        rng: &mut dyn RngCore,
    ) -> Vec<EventParam> {
        let mut params = vec![
            EventParam::string("article_id", article.article_id.as_str()),
            EventParam::string("writer_id", article.writer_id.as_str()),
        ];

        match event_name {
            EventName::PageView => {
                let page_location = format!(
                    "{}/{}/{}",
                    self.params.site_url.trim_end_matches('/'),
                    article.category,
                    article.article_id
                );
                params.push(EventParam::string("page_location", page_location));
                params.push(EventParam::string("page_title", article.title.as_str()));
            }
            EventName::Scroll => {
                params.push(EventParam::int(
                    "percent_scrolled",
                    self.scroll.generate(rng),
                ));
            }
            EventName::UserEngagement => {
                params.push(EventParam::int(
                    "engagement_time_msec",
                    self.engagement.generate(rng),
                ));
            }
            EventName::Click | EventName::ViewItem => {}
        }

        params
    }
}

fn pick(values: &[String], rng: &mut dyn RngCore) -> String {
    values.choose(rng).cloned().unwrap_or_default()
}
