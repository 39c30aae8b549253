//! Upstream Invoker: one [`GenerationRequest`] in, one upstream call, one
//! [`GenerationResponse`] out.
//!
//! Faults are logged here with their full detail and replaced by the
//! operation's generic message. No retries.

use crate::models::{GenerationRequest, GenerationResponse};
use crate::services::metrics::RelayMetrics;
use crate::services::providers::{ContentPart, GenerativeProvider, ImageRequest, ProviderError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use std::time::Instant;

pub fn analysis_instruction(filename: &str) -> String {
    format!(
        "Analyze this uploaded file named \"{}\" and provide a summary, key insights, or code analysis based on its content. Explain any potential issues.",
        filename
    )
}

#[derive(Clone)]
pub struct Invoker {
    provider: Arc<dyn GenerativeProvider>,
    metrics: Arc<RelayMetrics>,
}

impl Invoker {
    pub fn new(provider: Arc<dyn GenerativeProvider>, metrics: Arc<RelayMetrics>) -> Self {
        Self { provider, metrics }
    }

    pub fn provider(&self) -> &Arc<dyn GenerativeProvider> {
        &self.provider
    }

    #[tracing::instrument(skip_all, fields(operation = %request.operation()))]
    pub async fn invoke(&self, request: GenerationRequest) -> GenerationResponse {
        let operation = request.operation();
        let start = Instant::now();

        let result = self.call_upstream(request).await;
        let elapsed = start.elapsed();
        self.metrics
            .record_upstream(operation, elapsed, result.as_ref().err());

        match result {
            Ok(response) => {
                tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream call succeeded"
                );
                response
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    error_type = e.kind(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream call failed"
                );
                GenerationResponse::Error {
                    message: operation.failure_message().to_string(),
                }
            }
        }
    }

    async fn call_upstream(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        match request {
            GenerationRequest::Chat { prompt } => {
                let content = self
                    .provider
                    .generate_content(&[ContentPart::Text(prompt)])
                    .await?;
                Ok(GenerationResponse::Text { content })
            }
            GenerationRequest::Image { prompt } => {
                let images = self
                    .provider
                    .generate_image(&ImageRequest::single_square_jpeg(prompt))
                    .await?;
                let base64 = images.into_iter().next().ok_or_else(|| {
                    ProviderError::InvalidResponse("upstream returned no images".to_string())
                })?;
                Ok(GenerationResponse::Image { base64 })
            }
            GenerationRequest::FileAnalysis {
                filename,
                mime_type,
                bytes,
            } => {
                tracing::debug!(
                    filename = %filename,
                    mime_type = %mime_type,
                    size = bytes.len(),
                    "Encoding upload for multimodal analysis"
                );
                let parts = [
                    ContentPart::InlineData {
                        mime_type,
                        data: STANDARD.encode(&bytes),
                    },
                    ContentPart::Text(analysis_instruction(&filename)),
                ];
                let content = self.provider.generate_content(&parts).await?;
                Ok(GenerationResponse::Text { content })
            }
        }
    }
}
