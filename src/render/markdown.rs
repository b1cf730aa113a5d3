use crate::provider::Release;

/// GitHub-style heading anchor: lowercase, spaces become dashes, anything
/// other than letters, digits, `-` and `_` is dropped.
pub fn anchor(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

pub(super) fn render_toc(toc: &[&Release]) -> String {
    toc.iter()
        .map(|r| format!("- [{}](#{})\n", r.tag, anchor(&r.tag)))
        .collect()
}

pub(super) fn render(releases: &[Release]) -> String {
    let mut out = String::new();

    let toc: Vec<&Release> = super::table_of_contents(releases);
    if !toc.is_empty() {
        out.push_str("## Breaking changes\n\n");
        out.push_str(&render_toc(&toc));
        out.push('\n');
    }

    for release in releases {
        out.push_str(&format!("# {}\n\n", release.tag));
        if let Some(meta) = subtitle(release) {
            out.push_str(&format!("_{}_\n\n", meta));
        }
        let body = release.body_text().trim_end();
        if !body.is_empty() {
            out.push_str(body);
            out.push_str("\n\n");
        }
    }

    out
}

/// Name (when it differs from the tag), publish date and link.
pub(super) fn subtitle(release: &Release) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(name) = release.name.as_deref().filter(|n| !n.is_empty() && *n != release.tag) {
        parts.push(name.to_string());
    }
    if let Some(date) = release.published_at.as_deref() {
        parts.push(format!("published {}", date));
    }
    if let Some(url) = release.html_url.as_deref() {
        parts.push(url.to_string());
    }
    (!parts.is_empty()).then(|| parts.join(" · "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("v3"), "v3");
        assert_eq!(anchor("v1.2.0"), "v120");
        assert_eq!(anchor("Release Candidate_2"), "release-candidate_2");
        assert_eq!(anchor("@scope/pkg@1.0"), "scopepkg10");
    }

    #[test]
    fn test_render_release_with_metadata() {
        let releases = vec![Release {
            tag: "v1.0.0".to_string(),
            name: Some("First".to_string()),
            body: Some("Hello\n\n".to_string()),
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            html_url: None,
        }];
        let out = render(&releases);
        assert_eq!(
            out,
            "# v1.0.0\n\n_First · published 2024-01-01T00:00:00Z_\n\nHello\n\n"
        );
    }

    #[test]
    fn test_subtitle_skips_name_equal_to_tag() {
        let release = Release {
            tag: "v1".to_string(),
            name: Some("v1".to_string()),
            ..Default::default()
        };
        assert_eq!(subtitle(&release), None);
    }

    #[test]
    fn test_render_includes_breaking_section() {
        let releases = vec![
            Release {
                tag: "v1.2.0".to_string(),
                body: Some("BREAKING: renamed config".to_string()),
                ..Default::default()
            },
            Release {
                tag: "v1.1.0".to_string(),
                body: None,
                ..Default::default()
            },
        ];
        let out = render(&releases);
        assert!(out.starts_with("## Breaking changes\n\n- [v1.2.0](#v120)\n\n# v1.2.0\n\n"));
        assert!(out.ends_with("# v1.1.0\n\n"));
    }
}
