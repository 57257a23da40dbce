use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Base URL of the car comparison/recommendation service.
    pub api_url: String,
    pub api_timeout_secs: u64,
    pub notification_ttl_secs: u64,
    pub session_ttl_secs: u64,
    /// Substitute illustrative example data when the service fails.
    pub example_fallback: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            api_url: std::env::var("CARROS_API_URL")
                .map_err(|_| anyhow::anyhow!("CARROS_API_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("CARROS_API_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("CARROS_API_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            api_timeout_secs: secs_from_env("API_TIMEOUT_SECS", 10)?,
            notification_ttl_secs: secs_from_env("NOTIFICATION_TTL_SECS", 5)?,
            session_ttl_secs: secs_from_env("SESSION_TTL_SECS", 1800)?,
            example_fallback: match std::env::var("EXAMPLE_FALLBACK") {
                Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                    anyhow::anyhow!("EXAMPLE_FALLBACK must be true/false, got '{}'", raw)
                })?,
                Err(_) => true,
            },
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Car service URL: {}", config.api_url);
        tracing::debug!("Server Port: {}", config.port);
        if !config.example_fallback {
            tracing::info!("Example data fallback disabled");
        }

        Ok(config)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn secs_from_env(name: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", name)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
