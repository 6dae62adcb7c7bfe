use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

pub const DEFAULT_PROVIDER: ProviderId = ProviderId::WeatherBit;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider name, e.g. "weather-bit" or "openweather".
    pub provider: Option<String>,

    /// Upper bound for a single call to the weather API.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Example TOML:
    /// [providers.weather-bit]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A zero timeout would make every upstream call fail immediately.
fn ensure_timeout(secs: u64) -> Result<()> {
    if secs == 0 {
        bail!("timeout must be at least one second");
    }
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the provider to bind at startup. Not validated here; the registry does that.
    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().unwrap_or(DEFAULT_PROVIDER.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider = Some(id.as_str().to_string());
    }

    /// Load config from disk (or defaults on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        ensure_timeout(cfg.timeout_secs).context("Invalid timeout_secs")?;
        Ok(cfg)
    }

    /// Overrides file values with `WEATHER_PROVIDER`, `WEATHER_TIMEOUT_SECS` and the
    /// per-provider `<PROVIDER>_API_KEY` variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("WEATHER_PROVIDER").filter(|v| !v.is_empty()) {
            self.provider = Some(name);
        }

        if let Some(raw) = lookup("WEATHER_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            let secs = raw
                .parse()
                .with_context(|| format!("WEATHER_TIMEOUT_SECS must be a whole number, got '{raw}'"))?;
            ensure_timeout(secs).context("Invalid WEATHER_TIMEOUT_SECS")?;
            self.timeout_secs = secs;
        }

        for id in ProviderId::all() {
            if let Some(key) = lookup(id.api_key_env()).filter(|v| !v.is_empty()) {
                self.providers
                    .insert(id.as_str().to_string(), ProviderConfig { api_key: key });
            }
        }

        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "beer-forecast", "beer")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first configured provider becomes the default.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.provider.is_none() {
            self.set_provider(provider_id);
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
