use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use std::time::Duration;

use crate::{
    http::{HttpClient, RetryPolicy},
    provider::{DEFAULT_API_URL, GitHubProvider, ReleaseSource},
    runtime::Runtime,
};

pub const USER_AGENT: &str = "ghrn-cli";
pub const GITHUB_API_ACCEPT: &str = "application/vnd.github.v3+json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Config<R: Runtime, S: ReleaseSource> {
    pub runtime: R,
    pub source: S,
}

impl<R: Runtime> Config<R, GitHubProvider> {
    pub fn new(runtime: R, settings: &ClientSettings) -> Result<Self> {
        debug!(
            "Using API {} (timeout {:?}, retry {:?})",
            settings.api_url, settings.timeout, settings.retry
        );

        let client = build_client(settings.timeout)?;
        let http_client = HttpClient::with_policy(client, settings.retry.clone());
        let source = GitHubProvider::from_http_client(http_client, &settings.api_url);

        Ok(Self { runtime, source })
    }
}

impl<R: Runtime, S: ReleaseSource> Config<R, S> {
    /// Use an already constructed source, e.g. a mock.
    pub fn with_source(runtime: R, source: S) -> Self {
        Self { runtime, source }
    }
}

/// A reqwest client that asks for the v3 JSON representation.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_API_ACCEPT));

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()?;

    Ok(client)
}
