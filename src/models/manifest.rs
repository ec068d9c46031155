use std::path::Path;

use serde::Deserialize;

use super::sticker::{PackSpec, PackType, Pricing, StickerSpec};
use crate::error::{AppError, AppResult};

/// Declarative multi-pack import file.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub packs: Vec<ManifestPack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPack {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub pack_type: PackType,
    pub icon: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_is_free")]
    pub is_free: bool,
    pub price: Option<i64>,
    #[serde(default)]
    pub stickers: Vec<ManifestSticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSticker {
    pub file: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_is_free() -> bool {
    true
}

impl Manifest {
    /// Resolve every entry against `base_dir`, the manifest's own directory.
    pub fn into_specs(self, base_dir: &Path, paid_pack_price: i64) -> AppResult<Vec<PackSpec>> {
        self.packs
            .into_iter()
            .enumerate()
            .map(|(idx, pack)| pack.into_spec(idx, base_dir, paid_pack_price))
            .collect()
    }
}

impl ManifestPack {
    fn into_spec(self, idx: usize, base_dir: &Path, paid_pack_price: i64) -> AppResult<PackSpec> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "pack #{} in manifest has an empty name",
                idx + 1
            )));
        }

        let pricing = if self.is_free {
            Pricing {
                is_free: true,
                price: self.price.unwrap_or(0),
            }
        } else {
            Pricing::paid(self.price.unwrap_or(paid_pack_price))
        };

        Ok(PackSpec {
            name: self.name,
            description: self.description,
            pack_type: self.pack_type,
            icon: base_dir.join(self.icon),
            tags: self.tags,
            pricing,
            stickers: self
                .stickers
                .into_iter()
                .map(|sticker| StickerSpec {
                    file: base_dir.join(sticker.file),
                    tags: sticker.tags,
                })
                .collect(),
        })
    }
}
