//! Text-to-HTML rendering for transcript entries.
//!
//! Only fenced code blocks are transformed. Everything else goes through
//! askama's HTML escaping, so upstream text can never inject markup.

use askama::Template;
use regex::Regex;
use std::sync::OnceLock;

static CODE_FENCE: OnceLock<Regex> = OnceLock::new();

fn code_fence() -> &'static Regex {
    CODE_FENCE.get_or_init(|| {
        Regex::new(r"```([A-Za-z0-9_]+)?\n([\s\S]*?)\n```").expect("code fence pattern is valid")
    })
}

/// A run of plain text, or a code block when `lang` is set (possibly empty).
struct Segment<'a> {
    lang: Option<&'a str>,
    text: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"{% for segment in segments %}{% match segment.lang %}{% when Some with (lang) %}<pre><code class="language-{{ lang }}">{{ segment.text }}</code></pre>{% when None %}{{ segment.text }}{% endmatch %}{% endfor %}"#,
    ext = "html"
)]
struct RichTextTemplate<'a> {
    segments: Vec<Segment<'a>>,
}

/// Render a template, logging instead of failing: a transcript entry is
/// better shown empty than lost.
pub(crate) fn render_fragment<T: Template>(template: &T) -> String {
    template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to render transcript fragment");
        String::new()
    })
}

/// Rewrite ```` ```lang\n...\n``` ```` blocks into `<pre><code class="language-lang">`
/// containers with trimmed content.
pub fn render_rich_text(text: &str) -> String {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in code_fence().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment {
                lang: None,
                text: &text[last..whole.start()],
            });
        }
        segments.push(Segment {
            lang: Some(caps.get(1).map(|m| m.as_str()).unwrap_or("")),
            text: caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
        });
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment {
            lang: None,
            text: &text[last..],
        });
    }

    render_fragment(&RichTextTemplate { segments })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_becomes_code_container() {
        let html = render_rich_text("```js\ncode\n```");
        assert_eq!(html, "<pre><code class=\"language-js\">code</code></pre>");
    }

    #[test]
    fn code_is_trimmed_and_surrounding_text_kept() {
        let html = render_rich_text("Try this:\n```rust\n  let x = 1;  \n```\nDone.");
        assert_eq!(
            html,
            "Try this:\n<pre><code class=\"language-rust\">let x = 1;</code></pre>\nDone."
        );
    }

    #[test]
    fn missing_language_leaves_empty_class_suffix() {
        let html = render_rich_text("```\nplain\n```");
        assert_eq!(html, "<pre><code class=\"language-\">plain</code></pre>");
    }

    #[test]
    fn multiple_blocks_are_rewritten_independently() {
        let html = render_rich_text("```py\na\n```\nand\n```sh\nb\n```");
        assert_eq!(html.matches("<pre><code").count(), 2);
        assert!(html.contains("language-py\">a<"));
        assert!(html.contains("language-sh\">b<"));
    }

    #[test]
    fn markup_outside_and_inside_blocks_is_escaped() {
        let html = render_rich_text("<script>x</script>\n```html\n<b>&</b>\n```");
        assert!(html.starts_with("&lt;script&gt;x"));
        assert!(html.contains("&lt;b&gt;&amp;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn non_ascii_language_tag_is_not_a_fence() {
        let text = "```日本\ncode\n```";
        let html = render_rich_text(text);
        assert!(!html.contains("<pre>"));
        assert_eq!(html, text);
    }

    #[test]
    fn other_markdown_is_not_transformed() {
        assert_eq!(render_rich_text("**bold** _em_"), "**bold** _em_");
    }

    #[test]
    fn empty_text_renders_empty() {
        assert_eq!(render_rich_text(""), "");
    }
}
