//! Mock provider for testing.

use super::{ContentPart, GenerativeProvider, ImageRequest, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Text calls echo their text parts; inline parts are summarized as
    /// `[mime/type: N base64 chars]`. Image calls return `images` copies of a
    /// fixed payload.
    Echo { images: usize },
    /// Every call fails with an API error carrying this detail.
    Fail(String),
}

/// Mock provider that counts upstream calls and remembers the last request.
pub struct MockProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_parts: Mutex<Vec<ContentPart>>,
    last_image_request: Mutex<Option<ImageRequest>>,
}

/// Payload returned by `Echo` image calls.
pub const MOCK_IMAGE_BASE64: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8U";

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_parts: Mutex::new(Vec::new()),
            last_image_request: Mutex::new(None),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo { images: 1 })
    }

    pub fn failing(detail: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(detail.into()))
    }

    /// Number of upstream calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_parts(&self) -> Vec<ContentPart> {
        self.last_parts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn last_image_request(&self) -> Option<ImageRequest> {
        self.last_image_request
            .lock()
            .ok()
            .and_then(|r| r.clone())
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate_content(&self, parts: &[ContentPart]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_parts.lock() {
            *last = parts.to_vec();
        }

        match &self.behavior {
            MockBehavior::Fail(detail) => Err(ProviderError::ApiError(detail.clone())),
            MockBehavior::Echo { .. } => Ok(parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text(text) => text.clone(),
                    ContentPart::InlineData { mime_type, data } => {
                        format!("[{}: {} base64 chars]", mime_type, data.len())
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_image_request.lock() {
            *last = Some(request.clone());
        }

        match &self.behavior {
            MockBehavior::Fail(detail) => Err(ProviderError::ApiError(detail.clone())),
            MockBehavior::Echo { images } => Ok(vec![MOCK_IMAGE_BASE64.to_string(); *images]),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.behavior {
            MockBehavior::Fail(detail) => Err(ProviderError::NotConfigured(detail.clone())),
            MockBehavior::Echo { .. } => Ok(()),
        }
    }
}
