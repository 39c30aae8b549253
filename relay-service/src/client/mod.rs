//! HTTP client for the relay plus an interactive chat session that feeds
//! replies into a [`Transcript`].

use crate::models::{ApiEnvelope, GenerationResponse, PromptBody};
use crate::presentation::{ChatTranscriptEntry, ClientCommand, Origin, Transcript};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str =
    "// ERROR CODE 404: Network connection failed. Could not reach server.";
pub const UPLOAD_NETWORK_ERROR_MESSAGE: &str =
    "// FILE UPLOAD ERROR: Failed to transfer file to server.";

/// The relay could not be reached or answered with something that is not an envelope.
#[derive(Debug, Error)]
#[error("Network error: {0}")]
pub struct NetworkError(#[from] reqwest::Error);

pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn chat(&self, prompt: &str) -> Result<ApiEnvelope, NetworkError> {
        self.post_prompt("/api/chat", prompt).await
    }

    pub async fn image(&self, prompt: &str) -> Result<ApiEnvelope, NetworkError> {
        self.post_prompt("/api/image", prompt).await
    }

    pub async fn upload(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiEnvelope, NetworkError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);

        let envelope = self
            .http
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    async fn post_prompt(&self, path: &str, prompt: &str) -> Result<ApiEnvelope, NetworkError> {
        let envelope = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&PromptBody {
                prompt: prompt.to_string(),
            })
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }
}

/// Best-effort MIME type from a file extension.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// One interactive session: routes input, calls the relay, grows the transcript.
pub struct ChatSession {
    client: RelayClient,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Handle one line of input. Returns the entries it appended.
    pub async fn submit(&mut self, input: &str) -> &[ChatTranscriptEntry] {
        let start = self.transcript.len();

        match ClientCommand::parse(input) {
            None => {}
            Some(ClientCommand::Chat(prompt)) => {
                self.transcript.push(ChatTranscriptEntry::user(prompt.clone()));
                let result = self.client.chat(&prompt).await;
                self.present(result, &Origin::Chat, NETWORK_ERROR_MESSAGE);
            }
            Some(ClientCommand::Image(prompt)) => {
                self.transcript.push(ChatTranscriptEntry::user(input));
                self.transcript.push(ChatTranscriptEntry::bot(format!(
                    "// COMMAND DETECTED: Initializing image generation for: {}",
                    prompt
                )));
                let result = self.client.image(&prompt).await;
                self.present(result, &Origin::Image { prompt }, NETWORK_ERROR_MESSAGE);
            }
            Some(ClientCommand::Upload(path)) => self.upload(&path).await,
        }

        &self.transcript.entries()[start..]
    }

    async fn upload(&mut self, path: &Path) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read upload");
                self.transcript.push(ChatTranscriptEntry::bot(format!(
                    "// FILE UPLOAD ERROR: Could not read {}.",
                    path.display()
                )));
                return;
            }
        };

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.transcript.push(ChatTranscriptEntry::user(format!(
            "UPLOAD REQUEST: File {} ({:.2} MB)",
            filename,
            bytes.len() as f64 / (1024.0 * 1024.0)
        )));
        self.transcript.push(ChatTranscriptEntry::bot(
            "// PROCESSING FILE: Initializing multimodal analysis...",
        ));

        let result = self
            .client
            .upload(&filename, guess_mime_type(path), bytes)
            .await;
        let origin = Origin::Upload {
            filename: result
                .as_ref()
                .ok()
                .and_then(|e| e.filename.clone())
                .unwrap_or(filename),
        };
        self.present(result, &origin, UPLOAD_NETWORK_ERROR_MESSAGE);
    }

    fn present(
        &mut self,
        result: Result<ApiEnvelope, NetworkError>,
        origin: &Origin,
        network_message: &str,
    ) {
        match result {
            Ok(envelope) => {
                let response: GenerationResponse = envelope.into_generation_response();
                self.transcript.present(&response, origin);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Relay request failed");
                self.transcript
                    .push(ChatTranscriptEntry::bot(network_message));
            }
        }
    }
}
