use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Optional JSON file overriding the built-in extraction rules.
    pub extraction_rules_path: Option<String>,
    pub max_upload_bytes: usize,
    /// Extracted PDF text shorter than this is treated as a scanned image.
    pub min_extracted_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            extraction_rules_path: None,
            max_upload_bytes: 10 * 1024 * 1024,
            min_extracted_chars: 50,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            extraction_rules_path: std::env::var("EXTRACTION_RULES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            min_extracted_chars: parse_env("MIN_EXTRACTED_CHARS", defaults.min_extracted_chars)?,
        })
    }
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
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
