//! Filesystem-based media storage implementation.

use crate::MediaStorage;
use darkroom_error::{DarkroomResult, StorageError, StorageErrorKind};
use std::path::{Component, Path, PathBuf};

/// Filesystem storage backend.
///
/// Keys are resolved below a base directory:
///
/// ```text
/// uploads/
/// ├── original/
/// │   └── 3f/
/// │       └── a1/
/// │           ├── 9c0e4b7d2a61f0c3b8e1a2d4c6f7e9a1.jpg
/// │           └── 9c0e4b7d2a61f0c3b8e1a2d4c6f7e9a1.mov   (live companion)
/// └── thumb/
///     └── 3f/
///         └── a1/
///             └── 9c0e4b7d2a615d7e0b44c1f2a9e83b06.jpg
/// ```
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> DarkroomResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::CreateDirectory {
                path: base_path.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path below the base directory.
    ///
    /// Rejects empty keys, absolute keys and keys that step outside the base.
    pub fn resolve(&self, key: &str) -> DarkroomResult<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(key.to_string())).into());
        }
        Ok(self.base_path.join(relative))
    }

    async fn ensure_parent(path: &Path) -> DarkroomResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::CreateDirectory {
                    path: parent.display().to_string(),
                    reason: e.to_string(),
                })
            })?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MediaStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: &[u8]) -> DarkroomResult<u64> {
        let path = self.resolve(key)?;
        Self::ensure_parent(&path).await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write {
                key: key.to_string(),
                reason: format!("moving the temporary file into place: {}", e),
            })
        })?;

        tracing::debug!(path = %path.display(), size = data.len(), "Stored media file");
        Ok(data.len() as u64)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> DarkroomResult<Vec<u8>> {
        let path = self.resolve(key)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::Missing(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::Read {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        })?;

        tracing::debug!(path = %path.display(), size = data.len(), "Read media file");
        Ok(data)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> DarkroomResult<()> {
        let path = self.resolve(key)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::Missing(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::Delete {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        })?;

        tracing::debug!(path = %path.display(), "Deleted media file");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, key: &str) -> DarkroomResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    #[tracing::instrument(skip(self))]
    async fn relocate(&self, from: &str, to: &str) -> DarkroomResult<()> {
        let source = self.resolve(from)?;
        let destination = self.resolve(to)?;

        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::Occupied(to.to_string())).into());
        }
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::Missing(from.to_string())).into());
        }
        Self::ensure_parent(&destination).await?;

        tokio::fs::rename(&source, &destination)
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Move {
                    from: from.to_string(),
                    to: to.to_string(),
                    reason: e.to_string(),
                })
            })?;

        tracing::info!(from, to, "Relocated media file");
        Ok(())
    }
}
