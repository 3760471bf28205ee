//! Process configuration.
//!
//! Values are layered, later sources winning: struct defaults, an optional
//! TOML file, then `BEDROCK_SERVE__*` environment variables using `__` as the
//! nesting separator (`BEDROCK_SERVE__AWS__REGION=eu-west-1`). The CORS
//! allow-list takes a comma-separated value. Command-line flags are applied
//! on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::llm::models::SamplingConfig;

pub const ENV_PREFIX: &str = "BEDROCK_SERVE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Origins allowed to call the service from a browser. `"*"` allows any origin.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Hosted model identifier, e.g. a Bedrock imported-model ARN.
    pub endpoint_id: Option<String>,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl ModelConfig {
    pub fn require_endpoint_id(&self) -> Result<&str, ConfigError> {
        self.endpoint_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::NotFound("model.endpoint_id".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_repo_id")]
    pub repo_id: String,
    #[serde(default = "default_revision")]
    pub revision: String,
    pub hub_token: Option<String>,
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,
    pub bucket: Option<String>,
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            repo_id: default_repo_id(),
            revision: default_revision(),
            hub_token: None,
            local_dir: default_local_dir(),
            bucket: None,
            key_prefix: String::new(),
        }
    }
}

impl ArtifactConfig {
    pub fn require_bucket(&self) -> Result<&str, ConfigError> {
        self.bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ConfigError::NotFound("artifacts.bucket".to_string()))
    }
}

fn default_repo_id() -> String {
    "deepseek-ai/DeepSeek-R1-Distill-Llama-8B".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("DeepSeek-R1-Distill-Llama-8B")
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
