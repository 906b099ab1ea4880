use crate::error::CacheError;
use crate::model::ContentId;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Ensures a local playable copy of a remote content video exists
#[async_trait]
pub trait CacheResolver: Send + Sync {
    /// Return the local path of `remote_url` for `content_id`
    async fn resolve(&self, content_id: ContentId, remote_url: &str)
        -> Result<PathBuf, CacheError>;
}

/// Resolves against a directory laid out as `<cache_dir>/<content_id>/<file name>`.
///
/// Files are expected to be placed there by whatever syncs the cache; a missing
/// file is reported as [`CacheError::NotCached`].
pub struct DirectoryCacheResolver {
    cache_dir: PathBuf,
}

impl DirectoryCacheResolver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Where `remote_url` is expected to live on disk
    pub fn local_path(&self, content_id: ContentId, remote_url: &str) -> Result<PathBuf, CacheError> {
        let without_query = remote_url.split(['?', '#']).next().unwrap_or_default();
        let file_name = without_query
            .rsplit('/')
            .next()
            .map(|name| name.replace("%20", " "))
            .filter(|name| !matches!(name.as_str(), "" | "." | ".."))
            .ok_or_else(|| CacheError::InvalidUrl {
                url: remote_url.to_string(),
            })?;

        Ok(self.cache_dir.join(content_id.to_string()).join(file_name))
    }
}

#[async_trait]
impl CacheResolver for DirectoryCacheResolver {
    async fn resolve(
        &self,
        content_id: ContentId,
        remote_url: &str,
    ) -> Result<PathBuf, CacheError> {
        let path = self.local_path(content_id, remote_url)?;
        debug!("Looking up cached video at {}", path.display());

        if fs::try_exists(&path).await? {
            Ok(path)
        } else {
            Err(CacheError::NotCached {
                content_id,
                path: path.display().to_string(),
            })
        }
    }
}
