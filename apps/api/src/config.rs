use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PREVIEW_MAX_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Where finished downloads are written.
    pub export_dir: PathBuf,
    pub preview_max_bytes: usize,
    pub session_idle_secs: u64,
    /// Registration notifications are only logged when unset.
    pub notify_webhook_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            export_dir: std::env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./exports")),
            preview_max_bytes: parse_env("PREVIEW_MAX_BYTES", DEFAULT_PREVIEW_MAX_BYTES)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
            notify_webhook_url: optional_env("NOTIFY_WEBHOOK_URL"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
