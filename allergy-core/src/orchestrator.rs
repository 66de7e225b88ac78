use chrono::Utc;
use std::{sync::Arc, time::Duration};

use crate::{
    engine,
    error::AdvisorError,
    history::{self, HistoryStore},
    model::{HistoryRecord, QueryOutcome, SymptomSet, WeatherRequest},
    provider::WeatherProvider,
};

/// Runs one advice query: fetch weather, derive advice, record history.
#[derive(Debug)]
pub struct QueryOrchestrator {
    provider: Box<dyn WeatherProvider>,
    history: Arc<dyn HistoryStore>,
    country: Option<String>,
    timeout: Duration,
}

impl QueryOrchestrator {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        history: Arc<dyn HistoryStore>,
        country: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self { provider, history, country, timeout }
    }

    pub async fn handle(
        &self,
        city: &str,
        symptoms: &SymptomSet,
    ) -> Result<QueryOutcome, AdvisorError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AdvisorError::invalid_input("Please enter a valid city."));
        }

        let request = WeatherRequest::new(city, self.country.clone());
        let lookup = self.provider.get_weather(&request);
        let snapshot = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(err)) => {
                tracing::warn!(city, error = %format!("{err:#}"), "weather lookup failed");
                return Err(AdvisorError::WeatherUnavailable);
            }
            Err(_) => {
                tracing::warn!(city, timeout = ?self.timeout, "weather lookup timed out");
                return Err(AdvisorError::WeatherUnavailable);
            }
        };

        tracing::info!(
            city,
            provider = %snapshot.provider,
            description = %snapshot.description,
            "weather retrieved"
        );

        let out_of_range = snapshot.out_of_range_fields();
        if !out_of_range.is_empty() {
            tracing::warn!(city, fields = ?out_of_range, "weather values outside documented range");
        }

        let unrecognized = symptoms.unrecognized();
        if !unrecognized.is_empty() {
            tracing::warn!(tags = ?unrecognized, "ignoring unrecognized symptom tags");
        }

        let advice = engine::derive(&snapshot, symptoms);

        let record = HistoryRecord::from_query(city, symptoms, &advice, Utc::now());
        let history_saved = match self.history.append(&record) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    city,
                    error = %format!("{err:#}"),
                    "failed to record query history"
                );
                false
            }
        };

        Ok(QueryOutcome { snapshot, advice, history_saved })
    }

    /// Past queries, newest first.
    pub fn history(&self) -> Result<Vec<HistoryRecord>, AdvisorError> {
        history::read_history(self.history.as_ref())
    }
}
