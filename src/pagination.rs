//! Paginated release fetching with client-side stop criteria.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::fmt;

use crate::provider::{Release, ReleaseSource, RepoId};

/// How the loaded-item counter advances after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CountMode {
    /// Count the requested page size, even for a short final page.
    #[default]
    Optimistic,
    /// Count the releases actually returned.
    Exact,
}

/// When to stop asking for more pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCriteria {
    pub max_items: Option<usize>,
    pub page_limit: usize,
    pub stop_version: Option<String>,
    pub count_mode: CountMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A release on the last page matched this tag or name.
    StopVersion(String),
    PageLimit,
    ItemCap,
    /// The source had no more pages.
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopVersion(v) => write!(f, "reached stop version {}", v),
            StopReason::PageLimit => write!(f, "reached page limit"),
            StopReason::ItemCap => write!(f, "reached item cap"),
            StopReason::Exhausted => write!(f, "no more releases"),
        }
    }
}

/// Releases aggregated across pages, in the order received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub releases: Vec<Release>,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

/// Drives a [`ReleaseSource`] page by page until a stop criterion trips.
pub struct Paginator<'a, S: ReleaseSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ReleaseSource + ?Sized> Paginator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Fetch pages sequentially. The page that trips a criterion is kept;
    /// nothing after it is requested.
    #[tracing::instrument(skip(self, criteria))]
    pub async fn collect(
        &self,
        repo: &RepoId,
        per_page: usize,
        criteria: &StopCriteria,
    ) -> Result<Collection> {
        if per_page == 0 {
            bail!("Page size must be at least 1");
        }

        let mut releases = Vec::new();
        let mut current_page = 1;
        let mut loaded = 0;

        loop {
            let page = self
                .source
                .list_releases(repo, current_page, per_page)
                .await
                .with_context(|| format!("Failed to fetch releases page {} of {}", current_page, repo))?;

            let received = page.releases.len();
            let stop_hit = criteria
                .stop_version
                .as_deref()
                .filter(|v| page.releases.iter().any(|r| r.matches_version(v)))
                .map(str::to_string);

            releases.extend(page.releases);
            loaded += match criteria.count_mode {
                CountMode::Optimistic => per_page,
                CountMode::Exact => received,
            };
            debug!(
                "Page {}: {} release(s), {} loaded, {} collected",
                current_page,
                received,
                loaded,
                releases.len()
            );

            let reason = if let Some(version) = stop_hit {
                Some(StopReason::StopVersion(version))
            } else if current_page >= criteria.page_limit {
                Some(StopReason::PageLimit)
            } else if criteria.max_items.is_some_and(|max| loaded >= max) {
                Some(StopReason::ItemCap)
            } else if !page.has_next {
                Some(StopReason::Exhausted)
            } else {
                None
            };

            if let Some(stop_reason) = reason {
                info!(
                    "Collected {} release(s) from {} in {} page(s): {}",
                    releases.len(),
                    repo,
                    current_page,
                    stop_reason
                );
                return Ok(Collection {
                    releases,
                    pages_fetched: current_page,
                    stop_reason,
                });
            }

            current_page += 1;
        }
    }
}
