//! GitHub release source.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use reqwest::Client;

use crate::http::HttpClient;

use super::{Release, ReleasePage, ReleaseSource, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub name: Option<String>,
        pub body: Option<String>,
        pub published_at: Option<String>,
        pub html_url: Option<String>,
    }
}

/// Lists releases through the GitHub REST API.
pub struct GitHubProvider {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubProvider {
    /// Create a new GitHub provider with custom API URL.
    /// Used primarily for testing.
    #[cfg(test)]
    pub fn with_api_url(client: Client, api_url: &str) -> Self {
        Self::from_http_client(
            HttpClient::with_policy(client, crate::http::RetryPolicy::immediate(1)),
            api_url,
        )
    }

    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReleaseSource for GitHubProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    async fn list_releases(
        &self,
        repo: &RepoId,
        page: usize,
        per_page: usize,
    ) -> Result<ReleasePage> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, repo.owner, repo.repo);
        debug!("Fetching releases page {} from {}...", page, url);

        let fetched = self
            .http_client
            .get_page::<Vec<api::Release>>(
                &url,
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            )
            .await?;

        let count = fetched.data.len();
        let has_next = count > 0 && fetched.has_next;
        debug!("Page {} returned {} release(s), has_next={}", page, count, has_next);

        Ok(ReleasePage {
            releases: fetched.data.into_iter().map(Release::from).collect(),
            has_next,
        })
    }
}

impl From<api::Release> for Release {
    fn from(r: api::Release) -> Self {
        Release {
            tag: r.tag_name,
            name: r.name,
            body: r.body,
            published_at: r.published_at,
            html_url: r.html_url,
        }
    }
}
