//! Relay endpoints: `/api/chat`, `/api/image`, `/api/upload`.

use crate::error::ApiError;
use crate::models::{ApiEnvelope, GenerationResponse, PromptBody};
use crate::services::normalizer;
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<ApiEnvelope>, ApiError> {
    let Json(body) = payload?;
    let request = normalizer::normalize_chat(body)?;

    let response = state.invoker.invoke(request).await;
    into_envelope(response).map(Json)
}

pub async fn image(
    State(state): State<AppState>,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<ApiEnvelope>, ApiError> {
    let Json(body) = payload?;
    let request = normalizer::normalize_image(body)?;

    let response = state.invoker.invoke(request).await;
    into_envelope(response).map(Json)
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiEnvelope>, ApiError> {
    let mut multipart = multipart?;
    let max_bytes = state.config.limits.max_upload_bytes;

    let file = normalizer::read_single_file(&mut multipart, max_bytes).await?;
    let filename = file.filename.clone();
    let request = normalizer::normalize_upload(file, max_bytes)?;

    tracing::info!(filename = %filename, "File analysis requested");

    let response = state.invoker.invoke(request).await;
    into_envelope(response).map(|envelope| Json(envelope.with_filename(filename)))
}

fn into_envelope(response: GenerationResponse) -> Result<ApiEnvelope, ApiError> {
    match response {
        GenerationResponse::Text { content } => Ok(ApiEnvelope::text(content)),
        GenerationResponse::Image { base64 } => Ok(ApiEnvelope::image(base64)),
        GenerationResponse::Error { message } => Err(ApiError::Upstream(message)),
    }
}
