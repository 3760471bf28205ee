use crate::llm::inference::InferenceClient;

pub struct AppState {
    pub client: InferenceClient,
}

impl AppState {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}
