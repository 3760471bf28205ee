use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_sdk_bedrockruntime::{
    error::{DisplayErrorContext, SdkError},
    operation::invoke_model::InvokeModelError,
    primitives::Blob,
    Client,
};

use crate::aws;
use crate::error::InferenceError;
use crate::llm::backend::{InferenceBackend, JSON_CONTENT_TYPE};

/// Bedrock Runtime `InvokeModel` backend.
pub struct BedrockBackend {
    client: Client,
}

impl BedrockBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// SDK retries are disabled: every failure reaches the caller on the first attempt.
    pub async fn from_region(region: &str) -> Self {
        let config = aws::sdk_config(region, RetryConfig::disabled()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl InferenceBackend for BedrockBackend {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InferenceError> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .body(Blob::new(body))
            .accept(JSON_CONTENT_TYPE)
            .content_type(JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(output.body.into_inner())
    }
}

fn classify_sdk_error(err: SdkError<InvokeModelError>) -> InferenceError {
    match &err {
        SdkError::ServiceError(service) => {
            InferenceError::Upstream(DisplayErrorContext(service.err()).to_string())
        }
        _ => InferenceError::Transport(DisplayErrorContext(&err).to_string()),
    }
}
