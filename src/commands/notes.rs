use anyhow::{Result, anyhow, bail};
use log::{debug, info};
use std::path::PathBuf;

use crate::{
    input::FetchForm,
    provider::ReleaseSource,
    render::{self, Format},
    runtime::Runtime,
    session::{Session, SessionState},
};

use super::config::{ClientSettings, Config};
use super::output::emit;

/// What to show from the collected releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Table of contents plus every release
    Notes,
    /// Table of contents only
    Breaking,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub format: Format,
    pub path: Option<PathBuf>,
}

/// Fetch and render the full release notes of a repository.
#[tracing::instrument(skip(runtime, settings))]
pub async fn notes<R: Runtime>(
    runtime: R,
    form: &FetchForm,
    output: &Output,
    settings: &ClientSettings,
) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    run(config, form, View::Notes, output).await
}

/// Fetch releases and list only those flagged as breaking.
#[tracing::instrument(skip(runtime, settings))]
pub async fn breaking<R: Runtime>(
    runtime: R,
    form: &FetchForm,
    output: &Output,
    settings: &ClientSettings,
) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    run(config, form, View::Breaking, output).await
}

#[tracing::instrument(skip(config))]
pub async fn run<R: Runtime, S: ReleaseSource>(
    config: Config<R, S>,
    form: &FetchForm,
    view: View,
    output: &Output,
) -> Result<()> {
    let session = Session::new();
    info!(
        "Fetching releases for {} from {}...",
        form.repo.trim(),
        config.source.api_url()
    );
    session.run(&config.source, form).await?;

    let releases = match session.state() {
        SessionState::Success(releases) => releases,
        SessionState::Error(cause) => return Err(anyhow!(cause)),
        state => bail!("Fetch finished in unexpected state '{}'", state.label()),
    };
    debug!("Rendering {} release(s) as {:?}", releases.len(), output.format);

    let text = match view {
        View::Notes => render::render(&releases, output.format),
        View::Breaking => render::render_toc(&releases, output.format),
    };

    if text.is_empty() && output.path.is_none() {
        let message = match view {
            View::Notes => format!("No releases found for {}.\n", form.repo.trim()),
            View::Breaking => format!("No breaking changes found for {}.\n", form.repo.trim()),
        };
        return config.runtime.print(&message);
    }

    emit(&config.runtime, &text, output.path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockReleaseSource, Release, ReleasePage};
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn acme_widgets() -> MockReleaseSource {
        let mut source = MockReleaseSource::new();
        source.expect_api_url().return_const("mock".to_string());
        source.expect_list_releases().times(1).returning(|_, _, _| {
            Ok(ReleasePage {
                releases: [
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
                .collect(),
                has_next: false,
            })
        });
        source
    }

    #[tokio::test]
    async fn test_run_notes_prints_rendered_markdown() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_print()
            .withf(|text| {
                text.starts_with("## Breaking changes\n\n- [v3](#v3)\n")
                    && text.contains("# v2\n\nminor fixes")
            })
            .times(1)
            .returning(|_| Ok(()));

        let config = Config::with_source(runtime, acme_widgets());
        run(
            config,
            &FetchForm::new("acme/widgets"),
            View::Notes,
            &Output::default(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_breaking_html() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_print()
            .with(eq("<ul>\n<li><a href=\"#v3\">v3</a></li>\n</ul>\n"))
            .times(1)
            .returning(|_| Ok(()));

        let config = Config::with_source(runtime, acme_widgets());
        let output = Output {
            format: Format::Html,
            path: None,
        };
        run(config, &FetchForm::new("acme/widgets"), View::Breaking, &output)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_writes_output_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == std::path::Path::new("/out/notes.md")
                    && String::from_utf8_lossy(contents).contains("# v1")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        runtime.expect_print().never();

        let config = Config::with_source(runtime, acme_widgets());
        let output = Output {
            format: Format::Markdown,
            path: Some(PathBuf::from("/out/notes.md")),
        };
        run(config, &FetchForm::new("acme/widgets"), View::Notes, &output)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_no_releases_message() {
        let mut source = MockReleaseSource::new();
        source.expect_api_url().return_const("mock".to_string());
        source
            .expect_list_releases()
            .returning(|_, _, _| Ok(ReleasePage::default()));

        let mut runtime = MockRuntime::new();
        runtime
            .expect_print()
            .with(eq("No releases found for acme/empty.\n"))
            .times(1)
            .returning(|_| Ok(()));

        let config = Config::with_source(runtime, source);
        run(
            config,
            &FetchForm::new("acme/empty"),
            View::Notes,
            &Output::default(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_invalid_repo_fetches_nothing() {
        let mut source = MockReleaseSource::new();
        source.expect_api_url().return_const("mock".to_string());
        source.expect_list_releases().never();
        let mut runtime = MockRuntime::new();
        runtime.expect_print().never();

        let config = Config::with_source(runtime, source);
        let err = run(
            config,
            &FetchForm::new("not-a-repo"),
            View::Notes,
            &Output::default(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Invalid repository format"));
    }

    #[tokio::test]
    async fn test_run_fetch_failure_is_reported() {
        let mut source = MockReleaseSource::new();
        source.expect_api_url().return_const("mock".to_string());
        source.expect_list_releases().returning(|_, _, _| {
            Err(anyhow::Error::from(crate::http::NonRetryableError::NotFound(
                "The repository or its releases were not found".to_string(),
            )))
        });
        let mut runtime = MockRuntime::new();
        runtime.expect_print().never();

        let config = Config::with_source(runtime, source);
        let err = run(
            config,
            &FetchForm::new("acme/missing"),
            View::Notes,
            &Output::default(),
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("acme/missing"));
        assert!(message.contains("Not found"));
    }
}
