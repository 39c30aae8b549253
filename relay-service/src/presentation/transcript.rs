//! Append-only chat transcript.

use super::render::{render_fragment, render_rich_text};
use crate::models::GenerationResponse;
use askama::Template;

pub const BOT_LABEL: &str = "DTZ NOVA AI BOT";
pub const USER_LABEL: &str = "You";

pub const CHAT_ERROR_PREFIX: &str = "// ERROR CODE 500: AI processing failed. Message: ";
pub const UPLOAD_ERROR_PREFIX: &str = "// FILE ANALYSIS ERROR: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => USER_LABEL,
            Sender::Bot => BOT_LABEL,
        }
    }
}

#[derive(Template)]
#[template(source = "<p><strong>{{ label }}:</strong> {{ text }}</p>", ext = "html")]
struct UserMessageTemplate<'a> {
    label: &'a str,
    text: &'a str,
}

/// `content` is already-rendered rich text.
#[derive(Template)]
#[template(source = "<p><strong>{{ label }}:</strong>{{ content|safe }}</p>", ext = "html")]
struct BotMessageTemplate<'a> {
    label: &'a str,
    content: &'a str,
}

#[derive(Template)]
#[template(
    source = "<p><strong>{{ label }}:</strong> Generated image for prompt: <em>{{ prompt }}</em></p>\n<img src=\"data:image/jpeg;base64,{{ base64 }}\" alt=\"{{ prompt }}\" />",
    ext = "html"
)]
struct ImageMessageTemplate<'a> {
    label: &'a str,
    prompt: &'a str,
    base64: &'a str,
}

#[derive(Template)]
#[template(path = "transcript.html")]
struct TranscriptPageTemplate<'a> {
    title: &'a str,
    entries: &'a [ChatTranscriptEntry],
}

/// One display unit. `text` is what a terminal shows; `rendered_content` is
/// the HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscriptEntry {
    pub sender: Sender,
    pub text: String,
    pub rendered_content: String,
}

impl ChatTranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        let text = text.into();
        let rendered_content = render_fragment(&UserMessageTemplate {
            label: USER_LABEL,
            text: &text,
        });
        Self {
            sender: Sender::User,
            text,
            rendered_content,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        let text = text.into();
        let rendered_content = render_fragment(&BotMessageTemplate {
            label: BOT_LABEL,
            content: &render_rich_text(&text),
        });
        Self {
            sender: Sender::Bot,
            text,
            rendered_content,
        }
    }

    pub fn image(prompt: &str, base64: &str) -> Self {
        let rendered_content = render_fragment(&ImageMessageTemplate {
            label: BOT_LABEL,
            prompt,
            base64,
        });
        Self {
            sender: Sender::Bot,
            text: format!("Generated image for prompt: {}", prompt),
            rendered_content,
        }
    }
}

/// What a response is answering; decides captions and error prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Chat,
    Image { prompt: String },
    Upload { filename: String },
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatTranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatTranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: ChatTranscriptEntry) {
        self.entries.push(entry);
    }

    /// Append the display unit for a relay reply.
    pub fn present(&mut self, response: &GenerationResponse, origin: &Origin) {
        let entry = match (response, origin) {
            (GenerationResponse::Text { content }, Origin::Upload { filename }) => {
                ChatTranscriptEntry::bot(format!(
                    "**FILE ANALYSIS COMPLETE** ({}): \n\n {}",
                    filename, content
                ))
            }
            (GenerationResponse::Text { content }, _) => ChatTranscriptEntry::bot(content.clone()),
            (GenerationResponse::Image { base64 }, Origin::Image { prompt }) => {
                ChatTranscriptEntry::image(prompt, base64)
            }
            (GenerationResponse::Image { base64 }, _) => ChatTranscriptEntry::image("", base64),
            (GenerationResponse::Error { message }, Origin::Upload { .. }) => {
                ChatTranscriptEntry::bot(format!("{}{}", UPLOAD_ERROR_PREFIX, message))
            }
            (GenerationResponse::Error { message }, _) => {
                ChatTranscriptEntry::bot(format!("{}{}", CHAT_ERROR_PREFIX, message))
            }
        };
        self.push(entry);
    }

    /// Standalone HTML page of the whole transcript.
    pub fn to_html_document(&self) -> Result<String, askama::Error> {
        TranscriptPageTemplate {
            title: BOT_LABEL,
            entries: &self.entries,
        }
        .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reply_renders_code_block() {
        let mut transcript = Transcript::new();
        transcript.present(
            &GenerationResponse::Text {
                content: "```js\ncode\n```".into(),
            },
            &Origin::Chat,
        );

        let entry = &transcript.entries()[0];
        assert_eq!(entry.sender, Sender::Bot);
        assert!(entry
            .rendered_content
            .contains("<pre><code class=\"language-js\">code</code></pre>"));
    }

    #[test]
    fn image_reply_has_caption_and_data_uri() {
        let mut transcript = Transcript::new();
        transcript.present(
            &GenerationResponse::Image {
                base64: "QUJD".into(),
            },
            &Origin::Image {
                prompt: "a <red> fox".into(),
            },
        );

        let html = &transcript.entries()[0].rendered_content;
        assert!(html.contains("src=\"data:image/jpeg;base64,QUJD\""));
        assert!(html.contains("<em>a &lt;red&gt; fox</em>"));
    }

    #[test]
    fn errors_get_origin_specific_prefix() {
        let mut transcript = Transcript::new();
        let error = GenerationResponse::Error {
            message: "File analysis failed.".into(),
        };
        transcript.present(&error, &Origin::Upload {
            filename: "a.pdf".into(),
        });
        transcript.present(&error, &Origin::Chat);

        assert_eq!(
            transcript.entries()[0].text,
            "// FILE ANALYSIS ERROR: File analysis failed."
        );
        assert!(transcript.entries()[1].text.starts_with(CHAT_ERROR_PREFIX));
    }

    #[test]
    fn upload_success_echoes_filename() {
        let mut transcript = Transcript::new();
        transcript.present(
            &GenerationResponse::Text {
                content: "Looks fine.".into(),
            },
            &Origin::Upload {
                filename: "report.csv".into(),
            },
        );
        assert!(transcript.entries()[0]
            .text
            .starts_with("**FILE ANALYSIS COMPLETE** (report.csv)"));
    }

    #[test]
    fn document_lists_entries_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(ChatTranscriptEntry::user("first"));
        transcript.push(ChatTranscriptEntry::bot("second"));

        let html = transcript.to_html_document().unwrap();
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert!(html.contains("<div class=\"message user\">"));
        assert!(html.contains("<div class=\"message bot\">"));
        assert_eq!(transcript.len(), 2);
    }
}
