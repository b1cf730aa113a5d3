use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{Event, Options, Parser, html::push_html};

use crate::provider::Release;

use super::markdown::subtitle;

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Release bodies are third-party content: raw HTML is shown as text.
fn body_html(out: &mut String, body: &str) {
    let events = Parser::new_ext(body, markdown_options()).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    });
    push_html(out, events);
}

pub(super) fn render_toc(toc: &[&Release]) -> String {
    if toc.is_empty() {
        return String::new();
    }

    let mut out = String::from("<ul>\n");
    for release in toc {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>\n",
            encode_double_quoted_attribute(&release.tag),
            encode_text(&release.tag)
        ));
    }
    out.push_str("</ul>\n");
    out
}

pub(super) fn render(releases: &[Release]) -> String {
    let mut out = render_toc(&super::table_of_contents(releases));

    for release in releases {
        out.push_str("<div>\n");
        out.push_str(&format!(
            "<h1 id=\"{}\">{}</h1>\n",
            encode_double_quoted_attribute(&release.tag),
            encode_text(&release.tag)
        ));
        if let Some(meta) = subtitle(release) {
            out.push_str(&format!("<p><em>{}</em></p>\n", encode_text(&meta)));
        }
        body_html(&mut out, release.body_text());
        out.push_str("</div>\n");
    }

    out
}
