//! Object storage collaborator.
//!
//! Uploaded images live under opaque keys such as
//! `uploads/2025-01-31/6f1c…e2.png`. The filesystem store keeps object bytes
//! and a JSON metadata sidecar in two parallel trees:
//!
//! ```text
//! <root>/objects/<key>
//! <root>/meta/<key>.json
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt object metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Metadata stored alongside each object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub content_type: String,
    pub size: u64,
    pub stored_at: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<ObjectMeta, StorageError>;

    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn head(&self, key: &str) -> Result<ObjectMeta, StorageError>;
}

/// Reject keys that could escape the store root.
///
/// Allowed: non-empty `/`-separated segments of ASCII alphanumerics and
/// `-_.`, no segment equal to `.` or `..`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidKey(key.to_string());

    if key.is_empty() || key.len() > 512 {
        return Err(invalid());
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid());
        }
    }
    Ok(())
}

// ============================================================================
// Filesystem store
// ============================================================================

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory tree if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join("objects")).await?;
        tokio::fs::create_dir_all(root.join("meta")).await?;
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join("objects").join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join("meta").join(format!("{key}.json"))
    }
}

fn not_found_or(key: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io(e)
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        let object_path = self.object_path(key);
        let meta_path = self.meta_path(key);
        ensure_parent(&object_path).await?;
        ensure_parent(&meta_path).await?;

        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            stored_at: Utc::now(),
        };

        // Metadata last, so a visible sidecar implies the object is complete
        tokio::fs::write(&object_path, &bytes).await?;
        tokio::fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;
        Ok(meta)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        tokio::fs::read(self.object_path(key))
            .await
            .map(Bytes::from)
            .map_err(|e| not_found_or(key, e))
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        let raw = tokio::fs::read(self.meta_path(key))
            .await
            .map_err(|e| not_found_or(key, e))?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, used in tests and for throwaway runs.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, (ObjectMeta, Bytes)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            stored_at: Utc::now(),
        };
        self.objects
            .write()
            .await
            .insert(key.to_string(), (meta.clone(), bytes));
        Ok(meta)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, StorageError> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|(meta, _)| meta.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
