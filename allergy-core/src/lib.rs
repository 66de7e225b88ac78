//! Core library for the `allergy` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The advice rule tables and the engine that applies them
//! - Abstraction over weather providers
//! - Query history storage
//! - The query orchestrator tying the above together
//! - A small client for a hosted text-generation model
//!
//! It is used by `allergy-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod rules;

pub use config::{AssistantConfig, Config, ProviderConfig};
pub use error::AdvisorError;
pub use generation::{CohereGenerator, TextGenerator, ask};
pub use history::{HistoryStore, SqliteHistoryStore, read_history};
pub use model::{
    AdviceItem, HistoryRecord, QueryOutcome, SymptomSet, WeatherRequest, WeatherSnapshot,
};
pub use orchestrator::QueryOrchestrator;
pub use provider::{ProviderId, WeatherProvider};
pub use rules::Symptom;
