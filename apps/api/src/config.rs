use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Path or name of the HTML-to-PDF engine binary (wkhtmltopdf).
    pub pdf_engine_bin: String,
    /// Hard cap on a single engine invocation, in seconds.
    pub pdf_engine_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            pdf_engine_bin: std::env::var("PDF_ENGINE_BIN")
                .unwrap_or_else(|_| "wkhtmltopdf".to_string()),
            pdf_engine_timeout_secs: std::env::var("PDF_ENGINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse::<u64>()
                .context("PDF_ENGINE_TIMEOUT_SECS must be a valid integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
