use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::HeaderValue;

use crate::filter::MatchMode;

pub const DEFAULT_BASE_URL: &str = "https://piloterr.com/api/v2";

/// Run settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    /// Lookback window in days
    pub days_since: u32,
    /// Page size for the rounds listing
    pub round_limit: u32,
    /// Safety cap on company lookups per run
    pub max_company_lookups: usize,
    /// How many matches to keep
    pub target_matches: usize,
    /// Pause after each accepted match
    pub sleep: Duration,
    pub slack_webhook_url: Option<String>,
    pub output_dir: PathBuf,
    pub taxonomy_file: Option<PathBuf>,
    pub match_mode: MatchMode,
}

impl Config {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("PILOTERR_API_KEY")
            .ok_or_else(|| anyhow!("Set PILOTERR_API_KEY in your environment or .env file"))?;

        let config = Config {
            api_key,
            base_url: get("PILOTERR_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            days_since: parse_or(&get, "DAYS_SINCE", 1)?,
            round_limit: parse_or(&get, "ROUND_LIMIT_PER_CALL", 50)?,
            max_company_lookups: parse_or(&get, "MAX_COMPANY_LOOKUPS", 20)?,
            target_matches: parse_or(&get, "TARGET_MATCHES", 2)?,
            sleep: parse_pause(parse_or(&get, "SLEEP_SEC", 0.2)?)?,
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
            taxonomy_file: get("TAXONOMY_FILE").map(PathBuf::from),
            match_mode: match get("KEYWORD_MATCHING") {
                Some(mode) => mode.parse::<MatchMode>().context("Invalid KEYWORD_MATCHING")?,
                None => MatchMode::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.round_limit == 0 {
            return Err(anyhow!("ROUND_LIMIT_PER_CALL must be at least 1"));
        }
        if self.target_matches == 0 {
            return Err(anyhow!("TARGET_MATCHES must be at least 1"));
        }
        if HeaderValue::from_str(&self.api_key).is_err() {
            return Err(anyhow!("PILOTERR_API_KEY contains characters not allowed in an HTTP header"));
        }
        Ok(())
    }
}

/// Seconds to a pause; negative, NaN and out-of-range values are rejected
fn parse_pause(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow!("SLEEP_SEC must be a non-negative number of seconds, got {} ({})", secs, e))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid {} value '{}'", key, raw)),
        None => Ok(default),
    }
}
