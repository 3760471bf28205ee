use async_trait::async_trait;

use crate::error::InferenceError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport to a hosted model: takes a serialized request body, returns the raw response body.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InferenceError>;
}
