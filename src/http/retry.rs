//! Retry policy and error classification for GitHub API requests.

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default number of attempts for transient failures.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default delay between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default upper bound on a server-requested rate-limit wait, in seconds.
pub const DEFAULT_MAX_RATE_LIMIT_WAIT_SECS: u64 = 60;

/// How an [`HttpClient`](super::HttpClient) retries failed requests.
///
/// Transient failures (connection errors, 5xx) are attempted up to
/// `max_attempts` times with `retry_delay` in between. A rate-limited
/// response is retried exactly once, after the delay the server asked for
/// (capped at `max_rate_limit_wait`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub retry_delay: Duration,
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_rate_limit_wait: Duration::from_secs(DEFAULT_MAX_RATE_LIMIT_WAIT_SECS),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps. Used by tests and by callers that handle
    /// pacing themselves.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            retry_delay: Duration::ZERO,
            max_rate_limit_wait: Duration::ZERO,
        }
    }

    /// The wait before the single rate-limit retry.
    pub fn rate_limit_wait(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.retry_delay)
            .min(self.max_rate_limit_wait)
    }
}

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Rate limit still exceeded after the single retry
    RateLimitExceeded(String),
    /// Authentication failed (HTTP 401)
    AuthenticationFailed(String),
    /// Resource not found (HTTP 404)
    NotFound(String),
    /// Forbidden access (HTTP 403 non-rate-limit)
    Forbidden(String),
    /// Other client errors that won't succeed on retry
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(msg) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", msg)
            }
            NonRetryableError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {}", msg)
            }
            NonRetryableError::NotFound(msg) => {
                write!(f, "Not found: {}", msg)
            }
            NonRetryableError::Forbidden(msg) => {
                write!(f, "Access forbidden: {}", msg)
            }
            NonRetryableError::ClientError(msg) => {
                write!(f, "Request error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// A rate-limited response. Carries the delay the server asked for, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimited {
    pub wait: Option<Duration>,
}

impl std::fmt::Display for RateLimited {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.wait {
            Some(wait) => write!(f, "GitHub API rate limit hit, retry after {}s", wait.as_secs()),
            None => write!(f, "GitHub API rate limit hit"),
        }
    }
}

impl std::error::Error for RateLimited {}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable, Err with a user-friendly message if not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    if let Some(status) = error.status() {
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(NonRetryableError::AuthenticationFailed(
                    "The API rejected the request as unauthenticated".to_string(),
                ));
            }
            StatusCode::FORBIDDEN => {
                return Err(NonRetryableError::Forbidden(
                    "Access to this resource is forbidden".to_string(),
                ));
            }
            StatusCode::NOT_FOUND => {
                return Err(NonRetryableError::NotFound(
                    "The repository or its releases were not found".to_string(),
                ));
            }
            s if s.is_client_error() => {
                return Err(NonRetryableError::ClientError(format!(
                    "HTTP {} error",
                    s.as_u16()
                )));
            }
            // 5xx server errors are retryable
            _ => {}
        }
    }

    // Connection errors, timeouts, etc. are retryable
    Ok(())
}

/// Checks if an error from `error_for_status()` should be retried.
/// Returns the original error if retryable, or a user-friendly NonRetryableError if not.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

/// Turns a non-success response into the matching error.
///
/// Rate-limited responses become [`RateLimited`]; everything else goes
/// through [`check_retryable`].
pub fn check_status(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if is_rate_limited(status, response.headers()) {
        let wait = rate_limit_delay(response.headers(), unix_now());
        return Err(RateLimited { wait }.into());
    }

    response.error_for_status().map_err(check_retryable)
}

/// GitHub signals primary rate limits with 403 and `x-ratelimit-remaining: 0`,
/// secondary limits with 403 or 429 and a `retry-after` header.
pub fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => {
            header_u64(headers, "x-ratelimit-remaining") == Some(0)
                || headers.contains_key("retry-after")
        }
        _ => false,
    }
}

/// The delay a rate-limited response asks for: `retry-after` seconds first,
/// then the distance to the `x-ratelimit-reset` epoch.
pub fn rate_limit_delay(headers: &HeaderMap, now_secs: u64) -> Option<Duration> {
    if let Some(secs) = header_u64(headers, "retry-after") {
        return Some(Duration::from_secs(secs));
    }
    header_u64(headers, "x-ratelimit-reset")
        .map(|reset| Duration::from_secs(reset.saturating_sub(now_secs)))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
