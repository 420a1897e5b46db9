//! Read-only resource stores backing `/files/download`.
//!
//! Resources are addressed by file name only. The embedded store serves the
//! `resources/` folder compiled into the binary; the directory store reads the
//! same layout from disk so deployments can swap files without a rebuild.

use async_trait::async_trait;
use rust_embed::RustEmbed;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncRead;

use crate::config::{ResourceSource, ResourcesConfig};
use crate::error::{AppError, Result};

/// Files bundled into the binary at build time.
#[derive(RustEmbed)]
#[folder = "resources/"]
pub struct BundledAssets;

/// Byte stream over a resolved resource.
pub type ResourceReader = Box<dyn AsyncRead + Send + Unpin>;

/// A resolved resource, ready to be streamed.
///
/// The reader is owned by whoever holds the `Resource`; dropping it closes
/// the underlying file.
pub struct Resource {
    /// Name the resource was resolved under
    pub name: String,
    /// Size in bytes
    pub len: u64,
    /// Modification time, when the store records one
    pub last_modified: Option<SystemTime>,
    /// Human-readable location, for logs
    pub origin: String,
    /// Content stream
    pub reader: ResourceReader,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("len", &self.len)
            .field("last_modified", &self.last_modified)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Trait for read-only, name-keyed resource stores.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Short identifier for logs (e.g. "embedded", "directory").
    fn kind(&self) -> &str;

    /// Open the resource with exactly this name.
    ///
    /// Returns `AppError::NotFound` when no such resource exists.
    async fn resolve(&self, name: &str) -> Result<Resource>;
}

/// Store serving [`BundledAssets`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedResources;

#[async_trait]
impl ResourceStore for EmbeddedResources {
    fn kind(&self) -> &str {
        "embedded"
    }

    async fn resolve(&self, name: &str) -> Result<Resource> {
        let file = BundledAssets::get(name).ok_or_else(|| AppError::NotFound(name.to_string()))?;

        let last_modified = file
            .metadata
            .last_modified()
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs));

        Ok(Resource {
            name: name.to_string(),
            len: file.data.len() as u64,
            last_modified,
            origin: format!("embedded:{}", name),
            reader: Box::new(Cursor::new(file.data)),
        })
    }
}

/// Store reading files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResourceStore for DirectoryResources {
    fn kind(&self) -> &str {
        "directory"
    }

    async fn resolve(&self, name: &str) -> Result<Resource> {
        let path = self.root.join(name);

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to open {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let metadata = file.metadata().await.map_err(|e| {
            AppError::Internal(format!("Failed to stat {}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(AppError::NotFound(name.to_string()));
        }

        Ok(Resource {
            name: name.to_string(),
            len: metadata.len(),
            last_modified: metadata.modified().ok(),
            origin: path.display().to_string(),
            reader: Box::new(file),
        })
    }
}

/// Build the store selected by configuration.
pub fn from_config(config: &ResourcesConfig) -> Arc<dyn ResourceStore> {
    match config.source {
        ResourceSource::Embedded => Arc::new(EmbeddedResources),
        ResourceSource::Directory => Arc::new(DirectoryResources::new(&config.directory)),
    }
}
