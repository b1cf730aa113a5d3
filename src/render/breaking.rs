//! Breaking-change detection.

use regex::Regex;
use std::sync::LazyLock;

use crate::provider::Release;

static BREAKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)breaking").expect("breaking pattern is valid"));

/// Heuristic: the body mentions "breaking" in any case.
pub fn is_breaking(release: &Release) -> bool {
    BREAKING.is_match(release.body_text())
}

/// Releases flagged as breaking, in their original order.
pub fn table_of_contents(releases: &[Release]) -> Vec<&Release> {
    releases.iter().filter(|r| is_breaking(r)).collect()
}
