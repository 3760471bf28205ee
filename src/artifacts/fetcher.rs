use std::path::{Component, Path, PathBuf};

use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};

use crate::error::ArtifactError;

/// A model hub that can list a repository and hand back local copies of its files.
pub trait ArtifactSource: Send + Sync {
    fn list_files(&self, repo_id: &str) -> Result<Vec<String>, ArtifactError>;
    fn download(&self, repo_id: &str, filename: &str) -> Result<PathBuf, ArtifactError>;
}

/// Hugging Face Hub source. Files land in the hub cache first and are linked out from there.
pub struct HubSource {
    api: Api,
    revision: String,
}

impl HubSource {
    pub fn new(token: Option<String>, revision: impl Into<String>) -> Result<Self, ArtifactError> {
        let api = ApiBuilder::new()
            .with_token(token)
            .with_progress(true)
            .build()
            .map_err(|e| ArtifactError::Hub {
                repo_id: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self {
            api,
            revision: revision.into(),
        })
    }

    fn repo(&self, repo_id: &str) -> ApiRepo {
        self.api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            self.revision.clone(),
        ))
    }
}

impl ArtifactSource for HubSource {
    fn list_files(&self, repo_id: &str) -> Result<Vec<String>, ArtifactError> {
        let info = self.repo(repo_id).info().map_err(|e| ArtifactError::Hub {
            repo_id: repo_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }

    fn download(&self, repo_id: &str, filename: &str) -> Result<PathBuf, ArtifactError> {
        self.repo(repo_id).get(filename).map_err(|e| ArtifactError::Hub {
            repo_id: repo_id.to_string(),
            message: format!("{filename}: {e}"),
        })
    }
}

/// Places every file of `repo_id` into `destination`, keeping repository-relative paths.
/// Existing files are overwritten; the first failure aborts the run.
pub fn fetch(
    source: &dyn ArtifactSource,
    repo_id: &str,
    destination: &Path,
) -> Result<Vec<PathBuf>, ArtifactError> {
    let files = source.list_files(repo_id)?;
    tracing::info!(repo_id, files = files.len(), destination = %destination.display(), "Fetching checkpoint");

    std::fs::create_dir_all(destination).map_err(|e| ArtifactError::io(destination, e))?;

    let mut written = Vec::with_capacity(files.len());
    for filename in files {
        if !is_relative_path(&filename) {
            return Err(ArtifactError::Hub {
                repo_id: repo_id.to_string(),
                message: format!("refusing to write outside destination: {filename}"),
            });
        }

        let cached = source.download(repo_id, &filename)?;
        let target = destination.join(&filename);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;
        }
        place_file(&cached, &target)?;

        tracing::info!("Fetched {}", filename);
        written.push(target);
    }

    Ok(written)
}

/// Hard-links the cached blob to `target` so the checkpoint is stored once.
/// Falls back to a copy when the cache sits on another filesystem.
fn place_file(cached: &Path, target: &Path) -> Result<(), ArtifactError> {
    // Hub snapshots are symlinks into the blob store; link the blob itself.
    let blob = std::fs::canonicalize(cached).map_err(|e| ArtifactError::io(cached, e))?;

    match std::fs::remove_file(target) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ArtifactError::io(target, e)),
    }

    if let Err(e) = std::fs::hard_link(&blob, target) {
        tracing::debug!("Hard link to {} failed ({}), copying", target.display(), e);
        std::fs::copy(&blob, target).map_err(|e| ArtifactError::io(target, e))?;
    }
    Ok(())
}

fn is_relative_path(filename: &str) -> bool {
    let path = Path::new(filename);
    !filename.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
