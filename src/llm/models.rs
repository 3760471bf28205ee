use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every request to the hosted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_max_tokens_to_sample")]
    pub max_tokens_to_sample: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,
}

fn default_max_tokens_to_sample() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    0.9
}

fn default_stop_sequences() -> Vec<String> {
    vec![".".to_string(), "\n".to_string()]
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens_to_sample: default_max_tokens_to_sample(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            stop_sequences: default_stop_sequences(),
        }
    }
}

/// JSON body of an invoke call: the prompt followed by the sampling parameters.
#[derive(Debug, Serialize)]
pub struct InvokePayload<'a> {
    pub prompt: &'a str,
    #[serde(flatten)]
    pub sampling: &'a SamplingConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvokeResponse {
    pub(crate) generation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}
