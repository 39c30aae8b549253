//! Domain models for the relay.

pub mod request;
pub mod response;

pub use request::{GenerationRequest, Operation, PromptBody, UploadedFile};
pub use response::{ApiEnvelope, GenerationResponse};
