use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use bedrock_serve::api::server::create_router;
use bedrock_serve::config::CorsConfig;
use bedrock_serve::error::InferenceError;
use bedrock_serve::llm::backend::InferenceBackend;
use bedrock_serve::llm::inference::InferenceClient;
use bedrock_serve::llm::models::SamplingConfig;
use bedrock_serve::AppState;

pub const TEST_MODEL_ID: &str = "arn:aws:bedrock:us-east-1:000000000000:imported-model/test";

pub enum MockReply {
    Body(&'static str),
    Transport,
    Upstream,
}

/// Stands in for the hosted model and counts how often it was called.
pub struct MockBackend {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(reply: MockReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(model_id, TEST_MODEL_ID);
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("payload is JSON");
        assert!(payload["prompt"].is_string());

        match self.reply {
            MockReply::Body(body) => Ok(body.as_bytes().to_vec()),
            MockReply::Transport => Err(InferenceError::Transport("dispatch failure".into())),
            MockReply::Upstream => Err(InferenceError::Upstream(
                "ValidationException: model not ready".into(),
            )),
        }
    }
}

pub fn test_app(backend: Arc<MockBackend>, cors: &CorsConfig) -> Router {
    let client = InferenceClient::new(backend, TEST_MODEL_ID, SamplingConfig::default());
    create_router(Arc::new(AppState::new(client)), cors)
}
