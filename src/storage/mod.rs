use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppResult, UploadError, UploadResult};

pub mod http;
pub mod memory;
pub mod minio;
pub mod postgres;

/// Pushes one local file to the object store.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Upload `path` on behalf of `owner_id` and return its public URL.
    async fn upload(&self, path: &Path, owner_id: &str) -> UploadResult<String>;

    /// Remove an object previously returned by [`AssetUploader::upload`].
    async fn discard(&self, _url: &str) -> UploadResult<()> {
        Err(UploadError::Unsupported)
    }
}

/// Key/value document store with hierarchical collections.
///
/// Collections are slash-separated paths such as `stickerPacks` or
/// `stickerPacks/<packId>/stickers`. `set_document` has upsert semantics.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn set_document(&self, collection: &str, id: &str, data: Value) -> AppResult<()>;

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<Value>>;

    async fn list_documents(&self, collection: &str) -> AppResult<Vec<(String, Value)>>;
}

/// MIME type for an image by file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub(crate) fn file_name_of(path: &Path) -> UploadResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| UploadError::MissingFile(path.to_path_buf()))
}

pub(crate) async fn read_asset(path: &Path) -> UploadResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(UploadError::MissingFile(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}
