//! Turns route-specific inbound requests into a [`GenerationRequest`].
//!
//! Every check here runs before the upstream provider is touched, so a
//! rejected request never costs an upstream call.

use crate::error::ApiError;
use crate::models::{GenerationRequest, PromptBody, UploadedFile};
use axum::body::Bytes;
use axum::extract::Multipart;
use validator::Validate;

/// Persona instruction placed in front of every chat prompt.
pub const PERSONA_PREFIX: &str = "Act as a professional software engineer and chatbot named DTZ NOVA AI BOT. Respond to this request, providing detailed code and explanations using markdown if needed: ";

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub fn compose_chat_prompt(prompt: &str) -> String {
    format!("{}{}", PERSONA_PREFIX, prompt)
}

pub fn normalize_chat(body: PromptBody) -> Result<GenerationRequest, ApiError> {
    let prompt = require_prompt(body)?;
    Ok(GenerationRequest::Chat {
        prompt: compose_chat_prompt(&prompt),
    })
}

/// The client strips any `/generate image` command token before sending.
pub fn normalize_image(body: PromptBody) -> Result<GenerationRequest, ApiError> {
    let prompt = require_prompt(body)?;
    Ok(GenerationRequest::Image { prompt })
}

pub fn normalize_upload(
    file: UploadedFile,
    max_bytes: usize,
) -> Result<GenerationRequest, ApiError> {
    if file.filename.trim().is_empty() {
        return Err(ApiError::Validation("No file uploaded.".to_string()));
    }
    if file.bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(GenerationRequest::FileAnalysis {
        filename: file.filename,
        mime_type: file.mime_type,
        bytes: file.bytes,
    })
}

/// Pull exactly one file out of a multipart body.
///
/// The file body is read chunk by chunk and abandoned as soon as it grows
/// past `max_bytes`. Parts without a file name are ordinary form fields and
/// are skipped.
pub async fn read_single_file(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedFile, ApiError> {
    let mut found: Option<UploadedFile> = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if found.is_some() {
            return Err(ApiError::Validation(
                "Only one file may be uploaded.".to_string(),
            ));
        }

        let mime_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if buffer.len() + chunk.len() > max_bytes {
                tracing::warn!(
                    filename = %filename,
                    limit = max_bytes,
                    "Upload rejected: file exceeds size limit"
                );
                return Err(too_large(max_bytes));
            }
            buffer.extend_from_slice(&chunk);
        }

        found = Some(UploadedFile {
            filename,
            mime_type,
            bytes: Bytes::from(buffer),
        });
    }

    found.ok_or_else(|| ApiError::Validation("No file uploaded.".to_string()))
}

fn require_prompt(body: PromptBody) -> Result<String, ApiError> {
    body.validate()?;
    if body.prompt.trim().is_empty() {
        return Err(ApiError::Validation("Prompt is required".to_string()));
    }
    Ok(body.prompt)
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::Validation(format!(
        "File too large. Maximum size is {} MB.",
        max_bytes / (1024 * 1024)
    ))
}
