use std::path::{Path, PathBuf};

use super::records;
use crate::{
    error::{AppError, AppResult},
    models::{Manifest, PackSpec, PackType, Pricing, StickerSpec},
};

/// Read a manifest and resolve its entries against the manifest's directory.
pub fn load_manifest(path: &Path, paid_pack_price: i64) -> AppResult<Vec<PackSpec>> {
    if !path.is_file() {
        return Err(AppError::ManifestNotFound(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path)?;
    let manifest: Manifest =
        serde_json::from_str(&raw).map_err(|source| AppError::InvalidManifest {
            path: path.to_path_buf(),
            source,
        })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    manifest.into_specs(base_dir, paid_pack_price)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn scan_stickers_dir(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::StickersDirNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if records::is_image_path(&path) {
            files.push(path);
        } else {
            tracing::debug!("Ignoring non-image file {}", path.display());
        }
    }
    files.sort();

    Ok(files)
}

/// A single pack described on the command line.
#[derive(Debug, Clone)]
pub struct DirectoryPack {
    pub name: String,
    pub description: String,
    pub pack_type: PackType,
    pub stickers_dir: PathBuf,
    pub icon: PathBuf,
    pub tags: Vec<String>,
    pub pricing: Pricing,
}

impl DirectoryPack {
    /// Check local inputs and list the stickers. Nothing touches the network.
    pub fn into_spec(self) -> AppResult<PackSpec> {
        if !self.stickers_dir.is_dir() {
            return Err(AppError::StickersDirNotFound(self.stickers_dir));
        }
        if !self.icon.is_file() {
            return Err(AppError::IconNotFound(self.icon));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("pack name must not be empty".to_string()));
        }

        let stickers = scan_stickers_dir(&self.stickers_dir)?
            .into_iter()
            .map(StickerSpec::untagged)
            .collect();

        Ok(PackSpec {
            name: self.name,
            description: self.description,
            pack_type: self.pack_type,
            icon: self.icon,
            tags: self.tags,
            pricing: self.pricing,
            stickers,
        })
    }
}

/// Split a comma-separated tag list, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
