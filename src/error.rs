use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Local input errors
    #[error("Stickers directory not found: {}", .0.display())]
    StickersDirNotFound(PathBuf),
    #[error("Icon file not found: {}", .0.display())]
    IconNotFound(PathBuf),
    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),
    #[error("Invalid manifest {}: {source}", .path.display())]
    InvalidManifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Document encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a single upload did not produce a URL.
///
/// Callers treat every variant the same way; the variant only feeds the log.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload endpoint returned status {0}")]
    Status(u16),
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upload timed out")]
    Timeout,
    #[error("Object store error: {0}")]
    Store(String),
    #[error("Operation not supported by this backend")]
    Unsupported,
}

pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write thumbnail: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thumbnail worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
