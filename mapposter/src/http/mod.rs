//! HTTP client abstraction for testability
//!
//! External services (Nominatim, Overpass) are reached through the
//! [`HttpClient`] trait so tests can substitute canned responses. Request
//! pacing and retries live next to it in [`RateLimiter`] and [`RetryPolicy`].

mod policy;
mod rate_limit;

pub use policy::{
    with_retry, RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS,
    DEFAULT_MAX_DELAY_SECS,
};
pub use rate_limit::RateLimiter;

use std::time::Duration;

use thiserror::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent sent to public OSM services.
pub const DEFAULT_USER_AGENT: &str = concat!("mapposter/", env!("CARGO_PKG_VERSION"));

/// Errors from HTTP operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    /// The client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The request did not complete (connection failure, timeout).
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),
}

impl HttpError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures, 429 and 5xx responses are transient; other
    /// statuses mean the request itself is wrong.
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Client(_) => false,
            HttpError::Request(_) | HttpError::Body(_) => true,
            HttpError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request with URL-encoded query parameters.
    ///
    /// Returns the response body on a 2xx status.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, HttpError>;

    /// Performs an HTTP POST with a URL-encoded form body.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, HttpError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom user agent and per-request timeout.
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response, url: &str) -> Result<Vec<u8>, HttpError> {
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Body(e.to_string()))
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| HttpError::Request(e.to_string()))?;
        Self::read(response, url)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| HttpError::Request(e.to_string()))?;
        Self::read(response, url)
    }
}
