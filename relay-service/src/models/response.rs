//! Canonical response shapes and the JSON envelope shared by relay and client.

use serde::{Deserialize, Serialize};

/// Result of one upstream invocation. Exactly one variant is ever produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    Text { content: String },
    /// Base64-encoded JPEG.
    Image { base64: String },
    /// Generic, caller-safe message. Upstream detail never lands here.
    Error { message: String },
}

/// `{success, response?, image_data?, filename?, error?}` as sent over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiEnvelope {
    pub fn text(content: String) -> Self {
        Self {
            success: true,
            response: Some(content),
            ..Default::default()
        }
    }

    pub fn image(base64: String) -> Self {
        Self {
            success: true,
            image_data: Some(base64),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    /// Client-side view of a decoded reply.
    pub fn into_generation_response(self) -> GenerationResponse {
        if !self.success {
            return GenerationResponse::Error {
                message: self.error.unwrap_or_default(),
            };
        }
        match (self.image_data, self.response) {
            (Some(base64), _) => GenerationResponse::Image { base64 },
            (None, content) => GenerationResponse::Text {
                content: content.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_envelope_omits_unused_fields() {
        let json = serde_json::to_value(ApiEnvelope::text("hi".into())).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "response": "hi"}));
    }

    #[test]
    fn failure_envelope_shape() {
        let json = serde_json::to_value(ApiEnvelope::failure("No file uploaded.")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "No file uploaded."})
        );
    }

    #[test]
    fn decoded_image_reply_becomes_image_response() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"success": true, "image_data": "AAAA"}"#).unwrap();
        assert_eq!(
            envelope.into_generation_response(),
            GenerationResponse::Image {
                base64: "AAAA".into()
            }
        );
    }

    #[test]
    fn decoded_failure_becomes_error_response() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"success": false, "error": "Image generation failed."}"#)
                .unwrap();
        assert_eq!(
            envelope.into_generation_response(),
            GenerationResponse::Error {
                message: "Image generation failed.".into()
            }
        );
    }
}
