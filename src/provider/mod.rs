//! Release sources.
//!
//! A [`ReleaseSource`] lists one page of a repository's releases at a time,
//! newest first. The pagination controller only talks to this trait, so the
//! GitHub implementation can be swapped for a mock in tests.

mod github;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::input::InputError;

pub use github::{DEFAULT_API_URL, GitHubProvider};

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+$").expect("repository pattern is valid")
});

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InputError::EmptyRepo);
        }
        if !REPO_PATTERN.is_match(s) {
            return Err(InputError::MalformedRepo(s.to_string()));
        }
        let (owner, repo) = s
            .split_once('/')
            .ok_or_else(|| InputError::MalformedRepo(s.to_string()))?;
        Ok(RepoId {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// A published release of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Version tag (e.g., "v1.0.0")
    pub tag: String,
    /// Release name/title
    pub name: Option<String>,
    /// Release notes, usually Markdown
    pub body: Option<String>,
    /// Publication date (ISO 8601)
    pub published_at: Option<String>,
    /// Release page on the hosting site
    pub html_url: Option<String>,
}

impl Release {
    /// Exact, case-sensitive match on tag or display name.
    pub fn matches_version(&self, version: &str) -> bool {
        self.tag == version || self.name.as_deref() == Some(version)
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// One page of releases as returned by a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleasePage {
    pub releases: Vec<Release>,
    /// Whether the source has more pages after this one.
    pub has_next: bool,
}

/// Lists releases of a repository, one page at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Base URL of the API this source talks to.
    fn api_url(&self) -> &str;

    /// Fetch page `page` (1-based) with up to `per_page` releases, newest first.
    async fn list_releases(&self, repo: &RepoId, page: usize, per_page: usize)
    -> Result<ReleasePage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_id_valid() {
        let repo = RepoId::from_str("owner/repo").unwrap();
        assert_eq!(
            repo,
            RepoId {
                owner: "owner".to_string(),
                repo: "repo".to_string()
            }
        );
    }

    #[test]
    fn test_parse_repo_id_allows_dots_dashes_underscores() {
        let repo = RepoId::from_str("my-org_1/some.repo-name_2").unwrap();
        assert_eq!(repo.owner, "my-org_1");
        assert_eq!(repo.repo, "some.repo-name_2");
    }

    #[test]
    fn test_parse_repo_id_trims_whitespace() {
        let repo = RepoId::from_str("  acme/widgets \n").unwrap();
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_parse_repo_id_empty() {
        assert_eq!(RepoId::from_str(""), Err(InputError::EmptyRepo));
        assert_eq!(RepoId::from_str("   "), Err(InputError::EmptyRepo));
    }

    #[test]
    fn test_parse_repo_id_malformed() {
        for bad in [
            "owner",
            "owner/",
            "/repo",
            "owner/repo/extra",
            "owner repo/x",
            "own@er/repo",
            "owner/repo?x=1",
        ] {
            assert!(
                matches!(RepoId::from_str(bad), Err(InputError::MalformedRepo(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_release_matches_version() {
        let release = Release {
            tag: "v2.0.0".to_string(),
            name: Some("Two".to_string()),
            ..Default::default()
        };
        assert!(release.matches_version("v2.0.0"));
        assert!(release.matches_version("Two"));
        assert!(!release.matches_version("V2.0.0"));
        assert!(!release.matches_version("two"));
        assert!(!release.matches_version(""));
    }

    #[test]
    fn test_release_body_text_defaults_to_empty() {
        let release = Release::default();
        assert_eq!(release.body_text(), "");
    }
}
