use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_API_KEY_ENV: &str = "FXC_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Keyed latest-rates vendor: `/v6/{key}/latest/{from}`.
    RateApi,
    /// Symbols/convert vendor: `/symbols` and `/convert`.
    ExchangeHost,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            kind: ProviderKind::ExchangeHost,
            base_url: "https://api.exchangerate.host".to_string(),
            api_key_env: None,
        }
    }
}

impl ProviderConfig {
    /// Reads the API key from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset. The rate-api vendor
    /// rejects that at provider construction; the exchange-host vendor
    /// treats the key as optional.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    pub fn api_key_var(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultPair {
    pub from: String,
    pub to: String,
}

impl Default for DefaultPair {
    fn default() -> Self {
        DefaultPair {
            from: "USD".to_string(),
            to: "PKR".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub defaults: DefaultPair,
    /// Delay after the last input change before a conversion request is
    /// dispatched.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            defaults: DefaultPair::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using built-in defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  kind: rate-api
  base_url: "https://v6.exchangerate-api.com"
  api_key_env: "MY_RATE_KEY"
defaults:
  from: "EUR"
  to: "JPY"
debounce_ms: 150
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.kind, ProviderKind::RateApi);
        assert_eq!(config.provider.base_url, "https://v6.exchangerate-api.com");
        assert_eq!(config.provider.api_key_env.as_deref(), Some("MY_RATE_KEY"));
        assert_eq!(config.defaults.from, "EUR");
        assert_eq!(config.defaults.to, "JPY");
        assert_eq!(config.debounce_ms, 150);
    }

    #[test]
    fn test_config_defaults_apply() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.provider.kind, ProviderKind::ExchangeHost);
        assert_eq!(config.provider.base_url, "https://api.exchangerate.host");
        assert_eq!(config.defaults.from, "USD");
        assert_eq!(config.defaults.to, "PKR");
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_api_key_read_from_named_env_var() {
        let config = ProviderConfig {
            kind: ProviderKind::RateApi,
            base_url: "http://example.com".to_string(),
            api_key_env: Some("FXC_TEST_KEY_VAR".to_string()),
        };

        // SAFETY: variable name is unique to this test, no concurrent reads.
        unsafe { std::env::set_var("FXC_TEST_KEY_VAR", "sekrit") };
        assert_eq!(config.api_key().as_deref(), Some("sekrit"));

        unsafe { std::env::remove_var("FXC_TEST_KEY_VAR") };
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_empty_api_key_treated_as_unset() {
        let config = ProviderConfig {
            kind: ProviderKind::ExchangeHost,
            base_url: "http://example.com".to_string(),
            api_key_env: Some("FXC_TEST_EMPTY_KEY_VAR".to_string()),
        };

        // SAFETY: variable name is unique to this test, no concurrent reads.
        unsafe { std::env::set_var("FXC_TEST_EMPTY_KEY_VAR", "") };
        assert_eq!(config.api_key(), None);
        unsafe { std::env::remove_var("FXC_TEST_EMPTY_KEY_VAR") };
    }
}
