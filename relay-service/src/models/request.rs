//! Canonical request shapes and their inbound wire forms.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON body accepted by `/api/chat` and `/api/image`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromptBody {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
}

/// A file part lifted out of a multipart upload, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// The single normalized value every relay route produces before calling upstream.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    /// Carries the composed prompt (persona prefix + user text).
    Chat { prompt: String },
    Image { prompt: String },
    FileAnalysis {
        filename: String,
        mime_type: String,
        bytes: Bytes,
    },
}

impl GenerationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            GenerationRequest::Chat { .. } => Operation::Chat,
            GenerationRequest::Image { .. } => Operation::Image,
            GenerationRequest::FileAnalysis { .. } => Operation::FileAnalysis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Chat,
    Image,
    FileAnalysis,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Chat => "chat",
            Operation::Image => "image",
            Operation::FileAnalysis => "file_analysis",
        }
    }

    /// The only failure text a caller ever sees for this operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Chat => "AI processing failed.",
            Operation::Image => "Image generation failed.",
            Operation::FileAnalysis => "File analysis failed.",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
