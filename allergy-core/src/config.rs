use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::ProviderId;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "command".to_string(),
            max_tokens: 300,
        }
    }
}

/// Top-level configuration stored on disk. Loaded once at start-up and
/// handed to whatever needs it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, e.g. "openweather" or "weatherapi".
    pub default_provider: Option<String>,

    /// Appended to every city lookup, e.g. "Mexico".
    pub country: Option<String>,

    pub request_timeout_secs: Option<u64>,

    /// Overrides the history database location.
    pub history_path: Option<PathBuf>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,

    pub assistant: Option<AssistantConfig>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No default provider configured.\n\
                 Hint: run `allergy configure <provider>` (e.g. `allergy configure openweather`) first."
            )
        })?;

        ProviderId::try_from(s.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "allergy-advisor", "allergy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where query history lives: `history_path` if set, else the platform data dir.
    pub fn history_db_path(&self) -> Result<PathBuf> {
        match &self.history_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("history.db")),
        }
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Sets the text-generation key, keeping any model overrides.
    pub fn set_assistant_api_key(&mut self, api_key: String) {
        self.assistant.get_or_insert_with(AssistantConfig::default).api_key = api_key;
    }

    /// Assistant settings, if an API key has been configured.
    pub fn assistant_config(&self) -> Result<&AssistantConfig> {
        self.assistant.as_ref().filter(|a| !a.api_key.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured for the assistant.\n\
                 Hint: run `allergy configure cohere` and enter your API key."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_id_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_provider_id().unwrap_err();

        assert!(err.to_string().contains("No default provider configured"));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::OpenWeather);

        let key = cfg.provider_api_key(ProviderId::OpenWeather);
        assert_eq!(key, Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
        assert!(!cfg.is_provider_configured(ProviderId::WeatherApi));
    }

    #[test]
    fn set_default_provider_overrides_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WEATHER_KEY".into());
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenWeather);

        cfg.set_default_provider(ProviderId::WeatherApi);
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::WeatherApi);
    }

    #[test]
    fn timeout_defaults_to_ten_seconds() {
        let mut cfg = Config::default();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));

        cfg.request_timeout_secs = Some(3);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn assistant_requires_a_key() {
        let mut cfg = Config::default();
        let err = cfg.assistant_config().unwrap_err();
        assert!(err.to_string().contains("allergy configure cohere"));

        cfg.set_assistant_api_key("CO_KEY".into());
        let assistant = cfg.assistant_config().unwrap();
        assert_eq!(assistant.api_key, "CO_KEY");
        assert_eq!(assistant.model, "command");
        assert_eq!(assistant.max_tokens, 300);
    }

    #[test]
    fn save_and_load_preserve_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WA".into());
        cfg.country = Some("Mexico".into());
        cfg.history_path = Some(dir.path().join("h.db"));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_provider_id().unwrap(), ProviderId::WeatherApi);
        assert_eq!(loaded.provider_api_key(ProviderId::WeatherApi), Some("WA"));
        assert_eq!(loaded.country.as_deref(), Some("Mexico"));
        assert_eq!(loaded.history_db_path().unwrap(), dir.path().join("h.db"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.providers.is_empty());
        assert!(cfg.default_provider.is_none());
    }

    #[test]
    fn partial_assistant_table_gets_defaults() {
        let cfg: Config = toml::from_str("[assistant]\napi_key = \"K\"\n").unwrap();
        let assistant = cfg.assistant_config().unwrap();
        assert_eq!(assistant.model, "command");
    }
}
