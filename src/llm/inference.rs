use std::sync::Arc;

use crate::error::InferenceError;
use crate::llm::backend::InferenceBackend;
use crate::llm::models::{GenerationResult, InvokePayload, InvokeResponse, SamplingConfig};

/// Client for one hosted model endpoint with fixed sampling parameters.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn InferenceBackend>,
    endpoint_id: String,
    sampling: SamplingConfig,
}

impl InferenceClient {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        endpoint_id: impl Into<String>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            backend,
            endpoint_id: endpoint_id.into(),
            sampling,
        }
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult, InferenceError> {
        invoke(self.backend.as_ref(), prompt, &self.sampling, &self.endpoint_id).await
    }

    /// Sends the same payload as [`generate`](Self::generate) but returns the whole response document.
    pub async fn invoke_raw(&self, prompt: &str) -> Result<serde_json::Value, InferenceError> {
        validate_prompt(prompt)?;
        let body = build_payload(prompt, &self.sampling)?;
        let response = self.backend.invoke_model(&self.endpoint_id, body).await?;
        serde_json::from_slice(&response).map_err(|e| InferenceError::Parse(e.to_string()))
    }
}

pub async fn invoke(
    backend: &dyn InferenceBackend,
    prompt: &str,
    sampling: &SamplingConfig,
    endpoint_id: &str,
) -> Result<GenerationResult, InferenceError> {
    validate_prompt(prompt)?;

    let body = build_payload(prompt, sampling)?;
    tracing::debug!(endpoint_id, bytes = body.len(), "Invoking hosted model");

    let response = backend.invoke_model(endpoint_id, body).await?;
    parse_generation(&response)
}

pub fn validate_prompt(prompt: &str) -> Result<(), InferenceError> {
    if prompt.trim().is_empty() {
        return Err(InferenceError::Validation("prompt must not be empty".to_string()));
    }
    Ok(())
}

pub fn build_payload(prompt: &str, sampling: &SamplingConfig) -> Result<Vec<u8>, InferenceError> {
    serde_json::to_vec(&InvokePayload { prompt, sampling })
        .map_err(|e| InferenceError::Internal(format!("could not encode payload: {e}")))
}

pub fn parse_generation(body: &[u8]) -> Result<GenerationResult, InferenceError> {
    let response: InvokeResponse =
        serde_json::from_slice(body).map_err(|e| InferenceError::Parse(e.to_string()))?;
    Ok(GenerationResult {
        text: response.generation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingBackend {
        reply: fn() -> Result<Vec<u8>, InferenceError>,
        calls: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingBackend {
        fn new(reply: fn() -> Result<Vec<u8>, InferenceError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceBackend for RecordingBackend {
        async fn invoke_model(
            &self,
            model_id: &str,
            body: Vec<u8>,
        ) -> Result<Vec<u8>, InferenceError> {
            self.calls.lock().unwrap().push((model_id.to_string(), body));
            (self.reply)()
        }
    }

    #[test]
    fn test_payload_carries_prompt_and_sampling() {
        let body = build_payload("Hello", &SamplingConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["prompt"], "Hello");
        assert_eq!(value["max_tokens_to_sample"], 100);
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["top_p"].as_f64().map(|p| (p * 10.0).round()), Some(9.0));
        assert_eq!(value["stop_sequences"], serde_json::json!([".", "\n"]));
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_parse_missing_generation() {
        let err = parse_generation(br#"{"outputs": []}"#).unwrap_err();
        assert!(matches!(err, InferenceError::Parse(_)));
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_generation(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, InferenceError::Parse(_)));
    }

    #[test]
    fn test_parse_generation_not_a_string() {
        let err = parse_generation(br#"{"generation": 42}"#).unwrap_err();
        assert!(matches!(err, InferenceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invoke_sends_to_endpoint() {
        let backend = RecordingBackend::new(|| {
            Ok(br#"{"generation": "Einstein formulated relativity.", "stop_reason": "stop"}"#.to_vec())
        });

        let result = invoke(&backend, "Summarize Einstein", &SamplingConfig::default(), "model-arn")
            .await
            .unwrap();

        assert_eq!(result.text, "Einstein formulated relativity.");
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "model-arn");
    }

    #[tokio::test]
    async fn test_empty_prompt_skips_backend() {
        let backend = RecordingBackend::new(|| Ok(br#"{"generation": "x"}"#.to_vec()));

        let err = invoke(&backend, "   ", &SamplingConfig::default(), "model-arn")
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::Validation(_)));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let backend =
            RecordingBackend::new(|| Err(InferenceError::Transport("connection reset".into())));

        let err = invoke(&backend, "hi", &SamplingConfig::default(), "model-arn")
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::Transport(_)));
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_raw_returns_document() {
        let backend = Arc::new(RecordingBackend::new(|| {
            Ok(br#"{"generation": "E = mc^2", "generation_token_count": 6}"#.to_vec())
        }));
        let client = InferenceClient::new(backend, "model-arn", SamplingConfig::default());

        let value = client.invoke_raw("Einstein?").await.unwrap();
        assert_eq!(value["generation_token_count"], 6);
    }
}
