use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::Symptom;

/// Separator used when a list is flattened into a single history column.
pub const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub city: String,
    /// Optional country qualifier appended to the provider query, e.g. "Mexico".
    pub country: Option<String>,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>, country: Option<String>) -> Self {
        Self { city: city.into(), country }
    }

    /// Location string in the `city,country` form both providers accept.
    pub fn query(&self) -> String {
        match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => format!("{},{}", self.city, country),
            _ => self.city.clone(),
        }
    }
}

/// A single normalized weather reading. Every measurement field is required;
/// providers fail rather than hand back a partial snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub provider: String,
    pub location_name: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    /// Human-cased condition phrase, e.g. "Light rain".
    pub description: String,
    pub wind_speed_mps: f64,
    /// Stand-in for a UV index. OpenWeatherMap reports no UV on its free
    /// current endpoint, so the daily max temperature is used there.
    pub uv_proxy: f64,
    pub pressure_hpa: f64,
    /// When the snapshot was retrieved, not when the reading was taken.
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Names of fields whose values fall outside their documented range.
    /// Values are never clamped; callers only log these.
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.humidity_pct > 100 {
            fields.push("humidity_pct");
        }
        if self.wind_speed_mps < 0.0 {
            fields.push("wind_speed_mps");
        }
        fields
    }
}

/// Capitalizes the first character and lower-cases the rest.
pub fn human_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Symptom tags as supplied by a caller, duplicates removed, order kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSet {
    tags: Vec<String>,
}

impl SymptomSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        let mut seen: Vec<TagKey> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            let key = TagKey::of(&tag);
            if !seen.contains(&key) {
                seen.push(key);
                set.tags.push(tag);
            }
        }
        set
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Recognized symptoms, in caller order.
    pub fn recognized(&self) -> impl Iterator<Item = Symptom> + '_ {
        self.tags.iter().filter_map(|tag| Symptom::from_tag(tag))
    }

    pub fn unrecognized(&self) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|tag| Symptom::from_tag(tag).is_none())
            .map(String::as_str)
            .collect()
    }
}

/// Identity used for duplicate removal: recognized tags collapse onto their
/// symptom (so aliases match), others compare trimmed and lower-cased.
#[derive(Debug, PartialEq, Eq)]
enum TagKey {
    Known(Symptom),
    Unknown(String),
}

impl TagKey {
    fn of(tag: &str) -> Self {
        match Symptom::from_tag(tag) {
            Some(symptom) => TagKey::Known(symptom),
            None => TagKey::Unknown(tag.trim().to_lowercase()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// One piece of advice and the reason it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdviceItem {
    pub advice: &'static str,
    pub cause: &'static str,
}

impl AdviceItem {
    pub const fn new(advice: &'static str, cause: &'static str) -> Self {
        Self { advice, cause }
    }
}

/// Keeps the advice half of each item. History stores only this half.
pub fn advice_only(items: &[AdviceItem]) -> Vec<&'static str> {
    items.iter().map(|item| item.advice).collect()
}

/// One past query, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub city: String,
    /// Symptom tags joined with [`LIST_SEPARATOR`].
    pub symptoms: String,
    /// Advice texts (causes dropped) joined with [`LIST_SEPARATOR`].
    pub recommendations: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn from_query(
        city: &str,
        symptoms: &SymptomSet,
        advice: &[AdviceItem],
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            city: city.to_string(),
            symptoms: symptoms.tags().join(LIST_SEPARATOR),
            recommendations: advice_only(advice).join(LIST_SEPARATOR),
            timestamp,
        }
    }
}

/// Result of a successful advice query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub snapshot: WeatherSnapshot,
    pub advice: Vec<AdviceItem>,
    /// False when the history record could not be written.
    pub history_saved: bool,
}
