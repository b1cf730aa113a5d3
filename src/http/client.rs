//! HTTP client with built-in retry logic and error handling.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;

use super::retry::{NonRetryableError, RateLimited, RetryPolicy, check_status};

/// One page of a paginated JSON listing.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPage<T> {
    pub data: T,
    /// Whether the `Link` header advertised a `next` page. GitHub omits the
    /// header when the whole listing fits on one page.
    pub has_next: bool,
}

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn with_policy(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Performs a GET request with query parameters and deserializes the
    /// JSON response, keeping the pagination hint from the `Link` header.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<JsonPage<T>> {
        debug!("GET page from {} with query {:?}...", url, query);

        self.with_retry("GET page", || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .context("Failed to send request")?;

            let response = check_status(response)?;
            let has_next = has_next_link(response.headers());

            // A malformed body will not improve on retry.
            let data = response.json::<T>().await.map_err(|e| {
                NonRetryableError::ClientError(format!("Failed to parse JSON response: {}", e))
            })?;

            Ok(JsonPage { data, has_next })
        })
        .await
    }

    /// Executes an async operation with retry logic.
    ///
    /// A rate-limited attempt is retried once after the requested delay and
    /// does not count against `max_attempts`. A second rate limit is fatal.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        let mut rate_limit_retried = false;

        loop {
            let e = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if let Some(limited) = e.downcast_ref::<RateLimited>() {
                if rate_limit_retried {
                    warn!("{}: rate limited again after retry, giving up", operation_name);
                    return Err(NonRetryableError::RateLimitExceeded(limited.to_string()).into());
                }
                rate_limit_retried = true;
                let wait = self.policy.rate_limit_wait(limited.wait);
                warn!(
                    "{}: {}, retrying once in {}ms...",
                    operation_name,
                    limited,
                    wait.as_millis()
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !is_retryable_error(&e) {
                debug!("{}: non-retryable error: {}", operation_name, e);
                return Err(e);
            }

            if attempt >= max_attempts {
                debug!("{}: giving up after {} attempts", operation_name, attempt);
                return Err(e);
            }

            warn!(
                "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                operation_name,
                attempt,
                max_attempts,
                e,
                self.policy.retry_delay.as_millis()
            );
            tokio::time::sleep(self.policy.retry_delay).await;
            attempt += 1;
        }
    }
}

/// Checks if an anyhow::Error is retryable based on its content.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}

/// Reads `rel="next"` out of a GitHub `Link` header.
fn has_next_link(headers: &HeaderMap) -> bool {
    let Some(link) = headers.get(LINK).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    link.split(',')
        .any(|part| part.split(';').skip(1).any(|p| p.trim() == r#"rel="next""#))
}
