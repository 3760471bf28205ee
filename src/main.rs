use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bedrock_serve::api::server;
use bedrock_serve::artifacts::{fetcher, publisher};
use bedrock_serve::config::Settings;
use bedrock_serve::llm::bedrock::BedrockBackend;
use bedrock_serve::llm::inference::InferenceClient;
use bedrock_serve::AppState;

#[derive(Debug, Parser)]
#[command(name = "bedrock-serve", version, about = "Serve and manage a Bedrock-hosted language model")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "BEDROCK_SERVE_CONFIG")]
    config: Option<PathBuf>,

    /// AWS region for Bedrock and S3
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP generate endpoint
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        endpoint_id: Option<String>,
    },
    /// Download a checkpoint from the Hugging Face Hub
    Fetch {
        #[arg(long)]
        repo_id: Option<String>,
        #[arg(long)]
        local_dir: Option<PathBuf>,
    },
    /// Upload a local checkpoint directory to S3
    Publish {
        #[arg(long)]
        local_dir: Option<PathBuf>,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Send one prompt to the hosted model and print the raw response
    Invoke {
        #[arg(default_value = "Provide a one-sentence summary of Albert Einstein's achievements.")]
        prompt: String,
        #[arg(long)]
        endpoint_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(region) = cli.region {
        settings.aws.region = region;
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            endpoint_id,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if endpoint_id.is_some() {
                settings.model.endpoint_id = endpoint_id;
            }

            let client = inference_client(&settings).await?;
            tracing::info!(model = client.endpoint_id(), region = %settings.aws.region, "Starting generate service");
            server::serve(Arc::new(AppState::new(client)), &settings.server).await?;
        }
        Command::Fetch { repo_id, local_dir } => {
            let repo_id = repo_id.unwrap_or(settings.artifacts.repo_id);
            let local_dir = local_dir.unwrap_or(settings.artifacts.local_dir);
            let token = settings.artifacts.hub_token;
            let revision = settings.artifacts.revision;

            let written = tokio::task::spawn_blocking(move || {
                let source = fetcher::HubSource::new(token, revision)?;
                fetcher::fetch(&source, &repo_id, &local_dir)
            })
            .await??;
            tracing::info!("Fetched {} files", written.len());
        }
        Command::Publish { local_dir, bucket } => {
            let local_dir = local_dir.unwrap_or(settings.artifacts.local_dir.clone());
            let bucket = match bucket {
                Some(bucket) => bucket,
                None => settings.artifacts.require_bucket()?.to_string(),
            };

            let store = publisher::S3Store::from_region(&settings.aws.region).await;
            let keys = publisher::publish(&store, &local_dir, &bucket, &settings.artifacts.key_prefix).await?;
            tracing::info!("Uploaded {} objects to s3://{}", keys.len(), bucket);
        }
        Command::Invoke {
            prompt,
            endpoint_id,
        } => {
            if endpoint_id.is_some() {
                settings.model.endpoint_id = endpoint_id;
            }

            let client = inference_client(&settings).await?;
            let response = client.invoke_raw(&prompt).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

async fn inference_client(settings: &Settings) -> Result<InferenceClient, Error> {
    let endpoint_id = settings.model.require_endpoint_id()?;
    let backend = BedrockBackend::from_region(&settings.aws.region).await;
    Ok(InferenceClient::new(
        Arc::new(backend),
        endpoint_id,
        settings.model.sampling.clone(),
    ))
}
