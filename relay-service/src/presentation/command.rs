//! Client-side routing of typed input to a relay endpoint.

use std::path::PathBuf;

pub const IMAGE_COMMAND: &str = "/generate image";
pub const UPLOAD_COMMAND: &str = "/upload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Raw text for `/api/chat`.
    Chat(String),
    /// Prompt for `/api/image`, command token already stripped and trimmed.
    Image(String),
    /// Local file for `/api/upload`.
    Upload(PathBuf),
}

impl ClientCommand {
    /// Route one line of input. Blank input routes nowhere.
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim().is_empty() {
            return None;
        }

        if let Some(rest) = strip_prefix_ignore_case(input, IMAGE_COMMAND) {
            return Some(ClientCommand::Image(rest.trim().to_string()));
        }

        if let Some(rest) = strip_prefix_ignore_case(input, UPLOAD_COMMAND) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let path = rest.trim();
                if !path.is_empty() {
                    return Some(ClientCommand::Upload(PathBuf::from(path)));
                }
            }
        }

        Some(ClientCommand::Chat(input.to_string()))
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_ignored() {
        assert_eq!(ClientCommand::parse("   "), None);
        assert_eq!(ClientCommand::parse(""), None);
    }

    #[test]
    fn plain_text_goes_to_chat_untouched() {
        assert_eq!(
            ClientCommand::parse("  explain lifetimes "),
            Some(ClientCommand::Chat("  explain lifetimes ".into()))
        );
    }

    #[test]
    fn image_command_is_stripped_and_trimmed() {
        assert_eq!(
            ClientCommand::parse("/generate image   a neon city  "),
            Some(ClientCommand::Image("a neon city".into()))
        );
    }

    #[test]
    fn image_command_is_case_insensitive() {
        assert_eq!(
            ClientCommand::parse("/GENERATE Image a cat"),
            Some(ClientCommand::Image("a cat".into()))
        );
    }

    #[test]
    fn bare_image_command_yields_empty_prompt() {
        assert_eq!(
            ClientCommand::parse("/generate image"),
            Some(ClientCommand::Image(String::new()))
        );
    }

    #[test]
    fn upload_command_takes_a_path() {
        assert_eq!(
            ClientCommand::parse("/upload ./notes/todo.md"),
            Some(ClientCommand::Upload(PathBuf::from("./notes/todo.md")))
        );
    }

    #[test]
    fn upload_without_path_is_chat() {
        assert_eq!(
            ClientCommand::parse("/upload"),
            Some(ClientCommand::Chat("/upload".into()))
        );
        assert_eq!(
            ClientCommand::parse("/uploader x"),
            Some(ClientCommand::Chat("/uploader x".into()))
        );
    }

    #[test]
    fn multibyte_input_shorter_than_command_does_not_panic() {
        assert_eq!(
            ClientCommand::parse("héllo"),
            Some(ClientCommand::Chat("héllo".into()))
        );
    }
}
