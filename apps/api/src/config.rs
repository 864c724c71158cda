use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::layout::font_resolver::DEFAULT_FONT_CANDIDATES;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_PANEL_PADDING_PX: u32 = 20;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Ordered font search list handed to the `FontResolver`.
    pub font_candidates: Vec<PathBuf>,
    pub max_upload_bytes: usize,
    /// Padding between the text block and the edge of its background panel.
    pub panel_padding_px: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            font_candidates: std::env::var("FONT_CANDIDATES")
                .map(|raw| parse_font_candidates(&raw))
                .unwrap_or(defaults.font_candidates),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            panel_padding_px: parse_env("PANEL_PADDING_PX", defaults.panel_padding_px)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            font_candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            panel_padding_px: DEFAULT_PANEL_PADDING_PX,
        }
    }
}

/// Splits a comma-separated path list, dropping blank entries.
pub fn parse_font_candidates(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
