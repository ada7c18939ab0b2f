use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; startup fails only on malformed values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the generation backend. Unset runs the service in
    /// heuristic-only mode.
    pub backend_url: Option<String>,
    pub backend_timeout_secs: u64,
    /// Quiet window of the live segmentation socket.
    pub debounce_ms: u64,
    /// Seeds the heuristic RNG for reproducible output.
    pub heuristic_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            backend_url: optional_env("BACKEND_URL"),
            backend_timeout_secs: parse_env("BACKEND_TIMEOUT_SECS", 60)?,
            debounce_ms: parse_env("DEBOUNCE_MS", 300)?,
            heuristic_seed: optional_env("HEURISTIC_SEED")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("HEURISTIC_SEED must be an unsigned integer")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            backend_url: None,
            backend_timeout_secs: 60,
            debounce_ms: 300,
            heuristic_seed: None,
        }
    }
}

/// Unset and blank values both read as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {value}")),
        None => Ok(default),
    }
}
