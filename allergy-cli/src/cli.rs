use std::sync::Arc;

use allergy_core::{
    Config, ProviderId, QueryOrchestrator, SqliteHistoryStore, Symptom, SymptomSet, ask,
    generation::CohereGenerator, provider, read_history,
};
use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "allergy", version, about = "Weather-driven allergy advice")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a weather provider or the assistant.
    Configure {
        /// "openweather", "weatherapi" or "cohere".
        service: String,
    },

    /// Show current weather and allergy advice for a city.
    Advise {
        /// City name.
        city: String,

        /// Symptom you are experiencing; repeat for several.
        #[arg(short, long = "symptom")]
        symptoms: Vec<String>,

        /// Use this provider instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// List past queries, newest first.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List recognized symptom tags.
    Symptoms,

    /// Ask the assistant a free-text question.
    Ask {
        question: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { service } => configure(&mut config, &service)?,
            Command::Advise { city, symptoms, provider } => {
                advise(&config, &city, symptoms, provider.as_deref()).await?
            }
            Command::History { limit } => show_history(&config, limit)?,
            Command::Symptoms => {
                for symptom in Symptom::all() {
                    println!("{:<22} (also: {})", symptom.tag(), symptom.legacy_tag());
                }
            }
            Command::Ask { question } => {
                let generator = CohereGenerator::from_config(
                    config.assistant_config()?,
                    config.request_timeout(),
                )?;
                let answer = ask(&generator, &question).await?;
                println!("{answer}");
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config, service: &str) -> anyhow::Result<()> {
    if service.eq_ignore_ascii_case("cohere") {
        let key = prompt_api_key("Cohere")?;
        config.set_assistant_api_key(key);
    } else {
        let id = ProviderId::try_from(service)?;
        if config.is_provider_configured(id) {
            println!("A key for {id} is already stored; it will be replaced.");
        }
        let key = prompt_api_key(id.as_str())?;
        config.upsert_provider_api_key(id, key);

        if config.default_provider_id().ok() != Some(id) {
            let make_default = inquire::Confirm::new(&format!("Make {id} the default provider?"))
                .with_default(true)
                .prompt()
                .context("Configuration cancelled")?;
            if make_default {
                config.set_default_provider(id);
            }
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn prompt_api_key(service: &str) -> anyhow::Result<String> {
    let key = inquire::Password::new(&format!("{service} API key:"))
        .without_confirmation()
        .prompt()
        .context("Configuration cancelled")?;

    let key = key.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    Ok(key)
}

async fn advise(
    config: &Config,
    city: &str,
    symptoms: Vec<String>,
    provider_override: Option<&str>,
) -> anyhow::Result<()> {
    let weather = match provider_override {
        Some(name) => provider::provider_from_config(ProviderId::try_from(name)?, config)?,
        None => provider::default_provider_from_config(config)?,
    };
    let store = open_history(config)?;
    let orchestrator = QueryOrchestrator::new(
        weather,
        Arc::new(store),
        config.country.clone(),
        config.request_timeout(),
    );

    let symptoms = SymptomSet::new(symptoms);
    let outcome = orchestrator.handle(city, &symptoms).await?;
    let snap = &outcome.snapshot;

    println!(
        "Weather in {} ({}), observed {}",
        snap.location_name,
        snap.provider,
        snap.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    );
    println!(
        "  {}, {:.1} °C, humidity {}%, wind {:.1} m/s, pressure {:.0} hPa, UV {:.1}",
        snap.description,
        snap.temperature_c,
        snap.humidity_pct,
        snap.wind_speed_mps,
        snap.pressure_hpa,
        snap.uv_proxy,
    );

    let unknown = symptoms.unrecognized();
    if !unknown.is_empty() {
        println!("\nUnrecognized symptoms ignored: {}", unknown.join(", "));
    }

    println!("\nRecommendations:");
    for (i, item) in outcome.advice.iter().enumerate() {
        println!("  {}. {}", i + 1, item.advice);
        println!("     {}", item.cause);
    }

    if !outcome.history_saved {
        eprintln!("\nWarning: this query could not be saved to history.");
    }

    Ok(())
}

fn open_history(config: &Config) -> anyhow::Result<SqliteHistoryStore> {
    let store = SqliteHistoryStore::open(&config.history_db_path()?)?;
    tracing::debug!(path = %store.path().display(), "opened history database");
    Ok(store)
}

fn show_history(config: &Config, limit: Option<usize>) -> anyhow::Result<()> {
    let store = open_history(config)?;
    let records = read_history(&store)?;

    if records.is_empty() {
        println!("No queries recorded yet.");
        return Ok(());
    }

    for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{}  {}",
            record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            record.city
        );
        if !record.symptoms.is_empty() {
            println!("    symptoms: {}", record.symptoms);
        }
        println!("    advice:   {}", record.recommendations);
    }

    Ok(())
}
