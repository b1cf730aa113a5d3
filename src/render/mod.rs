//! Presentation of collected releases.
//!
//! Both output formats share one layout: a table of contents linking to the
//! releases flagged as breaking, then every release with its notes.

pub mod breaking;
mod html;
mod markdown;

use crate::provider::Release;

pub use breaking::{is_breaking, table_of_contents};
pub use markdown::anchor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Markdown, release bodies passed through verbatim
    #[default]
    Markdown,
    /// HTML fragment, release bodies rendered from Markdown
    Html,
}

/// Table of contents followed by every release.
pub fn render(releases: &[Release], format: Format) -> String {
    match format {
        Format::Markdown => markdown::render(releases),
        Format::Html => html::render(releases),
    }
}

/// Only the table of contents.
pub fn render_toc(releases: &[Release], format: Format) -> String {
    let toc = table_of_contents(releases);
    match format {
        Format::Markdown => markdown::render_toc(&toc),
        Format::Html => html::render_toc(&toc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_widgets() -> Vec<Release> {
        [
            ("v3", "breaking: removed X"),
            ("v2", "minor fixes"),
            ("v1", "initial"),
        ]
        .iter()
        .map(|(tag, body)| Release {
            tag: tag.to_string(),
            body: Some(body.to_string()),
            ..Default::default()
        })
        .collect()
    }

    #[test]
    fn test_render_markdown_scenario() {
        let out = render(&acme_widgets(), Format::Markdown);
        assert!(out.contains("- [v3](#v3)"));
        assert!(!out.contains("- [v2]"));
        let v3 = out.find("# v3").unwrap();
        let v2 = out.find("# v2").unwrap();
        let v1 = out.find("# v1").unwrap();
        assert!(v3 < v2 && v2 < v1);
    }

    #[test]
    fn test_render_html_scenario() {
        let out = render(&acme_widgets(), Format::Html);
        assert!(out.contains(r##"<a href="#v3">v3</a>"##));
        assert!(!out.contains(r##"href="#v2""##));
        assert!(out.contains(r#"<h1 id="v1">v1</h1>"#));
    }

    #[test]
    fn test_render_toc_only() {
        let out = render_toc(&acme_widgets(), Format::Markdown);
        assert_eq!(out, "- [v3](#v3)\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], Format::Markdown), "");
        assert_eq!(render_toc(&[], Format::Html), "");
    }
}
