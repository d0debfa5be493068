//! Piloterr Crunchbase API client
//!
//! Blocking client for the two read endpoints the digest needs:
//! - `/crunchbase/funding_rounds` listing recent rounds
//! - `/crunchbase/company/info` looking up a single company
//!
//! Retryable failures (connect/timeout errors, 429/5xx gateway statuses) are
//! retried with exponential backoff. Anything else surfaces as an `ApiError`.

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::normalize::{is_blank, profile_from_value, round_from_value};
use crate::types::{CompanyProfile, FundingRound};

const ROUNDS_PATH: &str = "/crunchbase/funding_rounds";
const COMPANY_PATH: &str = "/crunchbase/company/info";

/// Keys the rounds listing may wrap its array under, in lookup order
const ROUND_LIST_KEYS: &[&str] = &["results", "data", "items"];

/// Statuses worth another attempt
const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Longest `Retry-After` we are willing to honour
const MAX_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// What to look a company up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyQuery {
    /// Crunchbase identifier, permalink or name
    Query(String),
    /// Website domain, e.g. `example.com`
    Domain(String),
}

impl CompanyQuery {
    fn param(&self) -> (&'static str, &str) {
        match self {
            CompanyQuery::Query(q) => ("query", q.as_str()),
            CompanyQuery::Domain(d) => ("domain", d.as_str()),
        }
    }
}

/// Read access to funding data
pub trait FundingApi {
    /// Rounds announced within the last `lookback_days`, at most `limit`
    fn fetch_rounds(&self, lookback_days: u32, limit: u32) -> Result<Vec<FundingRound>, ApiError>;

    /// Company profile, or `None` when the API has nothing for the query
    fn fetch_company(&self, query: &CompanyQuery) -> Result<Option<CompanyProfile>, ApiError>;
}

/// Retry budget for read requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt number `attempt` (1-based; attempt 0 never waits)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }

    pub fn should_retry_status(status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| ApiError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let http = Client::builder()
            .user_agent(concat!("travel-digest/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `path` with query params, retrying transient failures
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = self.http.get(&url).query(params).send();
            let is_last = attempt + 1 >= attempts;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<Value>()
                            .map_err(|source| ApiError::Decode { url: url.clone(), source });
                    }

                    let code = status.as_u16();
                    if !RetryPolicy::should_retry_status(code) || is_last {
                        return Err(ApiError::Status { status: code, url });
                    }

                    attempt += 1;
                    let delay = retry_after(&resp, status).unwrap_or_else(|| self.retry.delay_for(attempt));
                    warn!(
                        "HTTP {} from {}, retrying in {:.1}s (attempt {}/{})",
                        code,
                        path,
                        delay.as_secs_f64(),
                        attempt + 1,
                        attempts
                    );
                    thread::sleep(delay);
                }
                Err(e) => {
                    if !(e.is_connect() || e.is_timeout()) || is_last {
                        return Err(ApiError::Transport { url, source: e });
                    }

                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Request to {} failed ({}), retrying in {:.1}s (attempt {}/{})",
                        path,
                        e,
                        delay.as_secs_f64(),
                        attempt + 1,
                        attempts
                    );
                    thread::sleep(delay);
                }
            }
        }
    }
}

/// Honour `Retry-After` (in seconds) on 429/503 when it is reasonable
fn retry_after(resp: &Response, status: StatusCode) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    let seconds = resp
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    (seconds <= MAX_RETRY_AFTER_SECS).then(|| Duration::from_secs(seconds))
}

impl FundingApi for ApiClient {
    fn fetch_rounds(&self, lookback_days: u32, limit: u32) -> Result<Vec<FundingRound>, ApiError> {
        let params = [
            ("days_since_announcement", lookback_days.to_string()),
            ("limit", limit.to_string()),
        ];
        let body = self.get_json(ROUNDS_PATH, &params)?;
        let rounds = parse_rounds(&body);
        debug!("Parsed {} rounds from listing", rounds.len());
        Ok(rounds)
    }

    fn fetch_company(&self, query: &CompanyQuery) -> Result<Option<CompanyProfile>, ApiError> {
        let (key, value) = query.param();
        let body = self.get_json(COMPANY_PATH, &[(key, value.to_string())])?;
        Ok(parse_company(&body))
    }
}

/// Pull the round array out of whichever wrapper key the listing used
pub fn parse_rounds(body: &Value) -> Vec<FundingRound> {
    let items = ROUND_LIST_KEYS
        .iter()
        .filter_map(|k| body.get(*k))
        .find(|v| !is_blank(v))
        .and_then(Value::as_array);

    match items {
        Some(items) => items
            .iter()
            .filter(|item| item.is_object())
            .map(round_from_value)
            .collect(),
        None => {
            if body.is_array() {
                warn!("Rounds response is a bare array, expected a wrapped listing; ignoring");
            }
            vec![]
        }
    }
}

/// Company lookups answer with a flat object, or a `data` array whose first entry is the match
pub fn parse_company(body: &Value) -> Option<CompanyProfile> {
    let has_name = body.get("name").map(|n| !is_blank(n)).unwrap_or(false);
    if body.is_object() && has_name {
        return profile_from_value(body);
    }

    body.get("data")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(profile_from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rounds_wrapper_keys() {
        let body = json!({"results": [{"investment_type": "seed", "company_uuid": "a"}]});
        assert_eq!(parse_rounds(&body).len(), 1);

        let body = json!({"results": [], "data": [{"company_uuid": "a"}, {"company_uuid": "b"}]});
        assert_eq!(parse_rounds(&body).len(), 2);

        let body = json!({"items": [{"company_uuid": "a"}, "junk"]});
        assert_eq!(parse_rounds(&body).len(), 1);
    }

    #[test]
    fn test_parse_rounds_unexpected_shape_is_empty() {
        assert!(parse_rounds(&json!({"rounds": [{"company_uuid": "a"}]})).is_empty());
        assert!(parse_rounds(&json!({"results": "nope"})).is_empty());
        assert!(parse_rounds(&json!([])).is_empty());
    }

    #[test]
    fn test_parse_company_flat() {
        let co = parse_company(&json!({"name": "Wayfarer", "categories": ["Travel"]})).unwrap();
        assert_eq!(co.name, "Wayfarer");
        assert_eq!(co.categories, vec!["Travel"]);
    }

    #[test]
    fn test_parse_company_wrapped() {
        let body = json!({"data": [{"name": "First"}, {"name": "Second"}]});
        assert_eq!(parse_company(&body).unwrap().name, "First");
    }

    #[test]
    fn test_parse_company_empty() {
        assert!(parse_company(&json!({})).is_none());
        assert!(parse_company(&json!({"data": []})).is_none());
        assert!(parse_company(&json!({"data": [{}]})).is_none());
        assert!(parse_company(&json!({"name": "", "error": "not found"})).is_none());
    }

    #[test]
    fn test_retry_policy_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(3000));
    }

    #[test]
    fn test_retry_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(RetryPolicy::should_retry_status(code));
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!RetryPolicy::should_retry_status(code));
        }
    }

    #[test]
    fn test_invalid_api_key_is_fatal() {
        let mut config = Config::from_lookup(|key| (key == "PILOTERR_API_KEY").then(|| "k".to_string())).unwrap();
        assert!(ApiClient::new(&config).is_ok());

        config.api_key = "bad\u{1}key".to_string();
        assert!(matches!(ApiClient::new(&config), Err(ApiError::InvalidApiKey)));
    }

    #[test]
    fn test_company_query_param() {
        assert_eq!(CompanyQuery::Query("abc".into()).param(), ("query", "abc"));
        assert_eq!(CompanyQuery::Domain("stay.example".into()).param(), ("domain", "stay.example"));
    }
}
