//! HTTP-level tests for the API client
//! A scripted local server answers each connection with the next canned response

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use travel_digest::client::{ApiClient, ApiError, CompanyQuery, FundingApi, RetryPolicy};
use travel_digest::config::Config;

struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

fn reply(status: u16, body: &str) -> Reply {
    Reply {
        status,
        headers: vec![],
        body: body.to_string(),
    }
}

fn retry_after(status: u16, seconds: u64) -> Reply {
    Reply {
        status,
        headers: vec![("Retry-After", seconds.to_string())],
        body: String::new(),
    }
}

/// Serves `replies` in order, one per connection; returns the base URL and the raw requests seen
fn serve(replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            log.lock().unwrap().push(String::from_utf8_lossy(&request).to_string());

            let mut response = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                reply.status,
                reply.body.len()
            );
            for (name, value) in &reply.headers {
                response.push_str(&format!("{}: {}\r\n", name, value));
            }
            response.push_str("\r\n");
            response.push_str(&reply.body);
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{}", addr), seen)
}

fn client(base_url: &str) -> ApiClient {
    let base = base_url.to_string();
    let config = Config::from_lookup(move |key| match key {
        "PILOTERR_API_KEY" => Some("test-key".to_string()),
        "PILOTERR_BASE_URL" => Some(base.clone()),
        _ => None,
    })
    .unwrap();

    ApiClient::new(&config).unwrap().with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    })
}

const LISTING: &str = r#"{"data": [{"company_uuid": "a", "announced_on": "2025-06-02"}]}"#;

#[test]
fn test_transient_statuses_are_retried_until_success() {
    let (url, seen) = serve(vec![reply(503, ""), reply(503, ""), reply(200, LISTING)]);

    let rounds = client(&url).fetch_rounds(1, 50).unwrap();

    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].company_id.as_deref(), Some("a"));
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn test_retry_budget_exhausted_returns_status() {
    let (url, seen) = serve(vec![reply(503, ""), reply(503, ""), reply(503, "")]);

    let err = client(&url).fetch_rounds(1, 50).unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 503, .. }), "{}", err);
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn test_client_errors_are_not_retried() {
    let (url, seen) = serve(vec![reply(404, ""), reply(200, LISTING)]);

    let err = client(&url)
        .fetch_company(&CompanyQuery::Query("missing".to_string()))
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }), "{}", err);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_unreasonable_retry_after_is_ignored() {
    let (url, seen) = serve(vec![retry_after(429, 3600), reply(200, LISTING)]);

    let started = Instant::now();
    let rounds = client(&url).fetch_rounds(1, 50).unwrap();

    assert_eq!(rounds.len(), 1);
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn test_short_retry_after_is_honoured() {
    let (url, seen) = serve(vec![retry_after(503, 1), reply(200, LISTING)]);

    let started = Instant::now();
    client(&url).fetch_rounds(1, 50).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[test]
fn test_invalid_json_is_a_decode_error() {
    let (url, seen) = serve(vec![reply(200, "<html>maintenance</html>")]);

    let err = client(&url).fetch_rounds(1, 50).unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }), "{}", err);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_requests_carry_key_and_query_params() {
    let (url, seen) = serve(vec![
        reply(200, LISTING),
        reply(200, r#"{"name": "Wander", "categories": ["Travel"]}"#),
    ]);
    let api = client(&url);

    api.fetch_rounds(7, 25).unwrap();
    let company = api
        .fetch_company(&CompanyQuery::Domain("wander.example".to_string()))
        .unwrap()
        .unwrap();
    assert_eq!(company.name, "Wander");

    let seen = seen.lock().unwrap();
    let listing = seen[0].to_lowercase();
    assert!(listing.starts_with("get /crunchbase/funding_rounds?"));
    assert!(listing.contains("days_since_announcement=7"));
    assert!(listing.contains("limit=25"));
    assert!(listing.contains("x-api-key: test-key"));

    let lookup = seen[1].to_lowercase();
    assert!(lookup.starts_with("get /crunchbase/company/info?domain=wander.example "));
    assert!(lookup.contains("x-api-key: test-key"));
}
