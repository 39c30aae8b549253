//! Generative AI provider abstractions and implementations.
//!
//! The relay talks to its upstream only through [`GenerativeProvider`], so the
//! Gemini backend can be swapped for the in-process mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations. Messages may carry raw upstream
/// detail and are meant for server logs only.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered(_) => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Binary payload, already base64-encoded.
    InlineData { mime_type: String, data: String },
}

/// Parameters for a single image-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub number_of_images: u32,
    pub output_mime_type: String,
    pub aspect_ratio: String,
}

impl ImageRequest {
    /// One square JPEG, the only shape the relay asks for.
    pub fn single_square_jpeg(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            number_of_images: 1,
            output_mime_type: "image/jpeg".to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate text from a (possibly multimodal) single-turn user message.
    async fn generate_content(&self, parts: &[ContentPart]) -> Result<String, ProviderError>;

    /// Generate images, returned base64-encoded. May legitimately return fewer
    /// images than requested, including none.
    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError>;

    /// Cheap readiness check; must not spend upstream quota.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
