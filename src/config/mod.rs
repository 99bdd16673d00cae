use std::time::Duration;

use serde::Deserialize;

/// Placeholders shipped in the sample `.env`; a config still carrying them is
/// treated as unconfigured.
const URL_PLACEHOLDER: &str = "your_supabase_project_url_here";
const KEY_PLACEHOLDER: &str = "your_supabase_anon_key_here";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Supabase project URL (e.g., "https://xyz.supabase.co")
    pub supabase_url: String,

    /// Supabase anon (public) API key
    pub supabase_anon_key: String,

    /// Timeout for each backend request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl AppConfig {
    /// Load from the environment (and `.env`), then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot reach a real backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.supabase_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.supabase_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.supabase_url,
                url.scheme()
            )));
        }
        if self.supabase_url.contains(URL_PLACEHOLDER) {
            return Err(ConfigError::Placeholder("SUPABASE_URL"));
        }

        if self.supabase_anon_key.trim().is_empty() {
            return Err(ConfigError::MissingKey);
        }
        if self.supabase_anon_key.contains(KEY_PLACEHOLDER) {
            return Err(ConfigError::Placeholder("SUPABASE_ANON_KEY"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("SUPABASE_URL is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("{0} still holds the template placeholder")]
    Placeholder(&'static str),

    #[error("SUPABASE_ANON_KEY is empty")]
    MissingKey,

    #[error("REQUEST_TIMEOUT_SECS must be greater than zero")]
    InvalidTimeout,
}
