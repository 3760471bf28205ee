use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};

use crate::aws;
use crate::error::ArtifactError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), ArtifactError>;
}

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_region(region: &str) -> Self {
        let config = aws::sdk_config(region, RetryConfig::standard()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), ArtifactError> {
        let storage_error = |message: String| ArtifactError::Storage {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| storage_error(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| storage_error(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// Uploads every regular file under `source_dir`, keyed by its `/`-joined relative path.
/// Returns the uploaded keys in upload order. Stops at the first failed upload.
pub async fn publish(
    store: &dyn ObjectStore,
    source_dir: &Path,
    bucket: &str,
    key_prefix: &str,
) -> Result<Vec<String>, ArtifactError> {
    let files = collect_files(source_dir)?;
    tracing::info!(bucket, files = files.len(), source = %source_dir.display(), "Publishing checkpoint");

    let mut keys = Vec::with_capacity(files.len());
    for (relative, path) in files {
        let key = object_key(key_prefix, &relative)?;
        store.put_object(bucket, &key, &path).await?;
        tracing::info!("Uploaded {} to s3://{}/{}", path.display(), bucket, key);
        keys.push(key);
    }

    Ok(keys)
}

/// Lists regular files below `root` as (relative path, absolute path), sorted by relative path.
/// Symlinked directories are not followed.
pub fn collect_files(root: &Path) -> Result<Vec<(PathBuf, PathBuf)>, ArtifactError> {
    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(root: &Path, dir: &Path, files: &mut Vec<(PathBuf, PathBuf)>) -> Result<(), ArtifactError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ArtifactError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ArtifactError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ArtifactError::io(&path, e))?;

        if file_type.is_dir() {
            walk(root, &path, files)?;
        } else if path.is_file() {
            let relative = path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone());
            files.push((relative, path));
        }
    }
    Ok(())
}

pub fn object_key(prefix: &str, relative: &Path) -> Result<String, ArtifactError> {
    let key = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| ArtifactError::InvalidKey {
                path: relative.to_path_buf(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?
        .join("/");

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        Ok(key)
    } else {
        Ok(format!("{prefix}/{key}"))
    }
}
