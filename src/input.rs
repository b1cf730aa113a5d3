//! Validation of user-supplied fetch parameters.

use crate::pagination::{CountMode, StopCriteria};
use crate::provider::RepoId;

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: usize = 100;
pub const DEFAULT_PER_PAGE: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 100;
pub const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    EmptyRepo,
    MalformedRepo(String),
    PerPageOutOfRange(usize),
    PageLimitOutOfRange(usize),
    ZeroMaxItems,
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::EmptyRepo => write!(f, "Repository is required. Expected 'owner/repo'."),
            InputError::MalformedRepo(s) => write!(
                f,
                "Invalid repository format: '{}'. Expected 'owner/repo' using letters, digits, '-', '_' or '.'.",
                s
            ),
            InputError::PerPageOutOfRange(n) => {
                write!(f, "Page size {} is out of range (1-{}).", n, MAX_PER_PAGE)
            }
            InputError::PageLimitOutOfRange(n) => {
                write!(f, "Page limit {} is out of range (1-{}).", n, MAX_PAGE_LIMIT)
            }
            InputError::ZeroMaxItems => write!(f, "Maximum item count must be at least 1."),
        }
    }
}

impl std::error::Error for InputError {}

/// Raw fetch parameters as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchForm {
    pub repo: String,
    pub per_page: usize,
    pub page_limit: usize,
    pub max_items: Option<usize>,
    pub stop_version: Option<String>,
    pub count_mode: CountMode,
}

impl Default for FetchForm {
    fn default() -> Self {
        Self {
            repo: String::new(),
            per_page: DEFAULT_PER_PAGE,
            page_limit: DEFAULT_PAGE_LIMIT,
            max_items: None,
            stop_version: None,
            count_mode: CountMode::default(),
        }
    }
}

/// A validated request, ready for the pagination controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub repo: RepoId,
    pub per_page: usize,
    pub criteria: StopCriteria,
}

impl FetchForm {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<FetchRequest, InputError> {
        let repo = self.repo.parse::<RepoId>()?;

        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(InputError::PerPageOutOfRange(self.per_page));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(InputError::PageLimitOutOfRange(self.page_limit));
        }
        if self.max_items == Some(0) {
            return Err(InputError::ZeroMaxItems);
        }

        let stop_version = self
            .stop_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(FetchRequest {
            repo,
            per_page: self.per_page,
            criteria: StopCriteria {
                max_items: self.max_items,
                page_limit: self.page_limit,
                stop_version,
                count_mode: self.count_mode,
            },
        })
    }
}
