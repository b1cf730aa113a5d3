//! HTTP client module with retry logic and error handling.

mod client;
mod retry;

pub use client::{HttpClient, JsonPage};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RATE_LIMIT_WAIT_SECS, DEFAULT_RETRY_DELAY_MS,
    NonRetryableError, RateLimited, RetryPolicy, check_retryable, check_status, classify_error,
};
