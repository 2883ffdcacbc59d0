//! Markdown rendering for blog posts
//!
//! CommonMark plus tables, strikethrough and task lists via pulldown-cmark.
//! Raw HTML in the source is escaped, not passed through.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Length of an excerpt derived from the post body, in characters
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options
    }

    /// Render Markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options()).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }

    /// Plain-text excerpt of at most `max_chars` characters.
    ///
    /// Cuts at a word boundary and appends an ellipsis when truncated.
    pub fn excerpt(&self, markdown: &str, max_chars: usize) -> String {
        let mut text = String::new();
        let mut in_code_block = false;

        for event in Parser::new_ext(markdown, Self::options()) {
            match event {
                Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                Event::End(TagEnd::CodeBlock) => in_code_block = false,
                Event::Text(t) | Event::Code(t) if !in_code_block => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => text.push(' '),
                _ => {}
            }
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= max_chars {
            return collapsed;
        }

        let cut: String = collapsed.chars().take(max_chars).collect();
        let trimmed = match cut.rfind(' ') {
            Some(idx) if idx > 0 => &cut[..idx],
            _ => cut.as_str(),
        };
        format!("{}…", trimmed.trim_end_matches(|c: char| c.is_ascii_punctuation()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let html = MarkdownRenderer::new().render("# 5G is here\n\nThis is **fast**.");
        assert!(html.contains("<h1>5G is here</h1>"));
        assert!(html.contains("<strong>fast</strong>"));
    }

    #[test]
    fn test_render_table_and_strikethrough() {
        let html = MarkdownRenderer::new().render("| Plan | Speed |\n|---|---|\n| Home | 100 |\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = MarkdownRenderer::new().render("Hi <script>alert(1)</script>\n\n<div onclick=\"x\">block</div>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<div onclick"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(MarkdownRenderer::new().render(""), "");
    }

    #[test]
    fn test_excerpt_strips_markup() {
        let excerpt = MarkdownRenderer::new().excerpt("# Title\n\nSome *emphasis* and `code`.\n\n```\nskipped\n```", 200);
        assert_eq!(excerpt, "Title Some emphasis and code.");
    }

    #[test]
    fn test_excerpt_truncates_on_word_boundary() {
        let excerpt = MarkdownRenderer::new().excerpt("alpha beta gamma delta", 12);
        assert_eq!(excerpt, "alpha beta…");
    }
}
