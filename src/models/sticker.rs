use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Collection holding one document per pack.
pub const PACKS_COLLECTION: &str = "stickerPacks";

/// Sub-collection of a pack document holding its stickers.
pub fn stickers_collection(pack_id: &str) -> String {
    format!("{}/{}/stickers", PACKS_COLLECTION, pack_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PackType {
    Official,
    User,
    Trending,
}

impl Default for PackType {
    fn default() -> Self {
        Self::Official
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackType::Official => "official",
            PackType::User => "user",
            PackType::Trending => "trending",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub pack_type: PackType,
    pub icon_url: String,
    pub creator_id: String,
    pub sticker_count: u32,
    pub download_count: u64,
    pub is_published: bool,
    pub is_free: bool,
    pub price: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerRecord {
    pub id: String,
    pub pack_id: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub is_animated: bool,
    pub format: String,
    pub creator_id: String,
    pub tags: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub is_free: bool,
    pub price: i64,
}

impl Pricing {
    pub fn free() -> Self {
        Self {
            is_free: true,
            price: 0,
        }
    }

    pub fn paid(price: i64) -> Self {
        Self {
            is_free: false,
            price,
        }
    }
}

/// Everything needed to import one pack, with paths already resolved.
#[derive(Debug, Clone)]
pub struct PackSpec {
    pub name: String,
    pub description: String,
    pub pack_type: PackType,
    pub icon: PathBuf,
    pub tags: Vec<String>,
    pub pricing: Pricing,
    pub stickers: Vec<StickerSpec>,
}

#[derive(Debug, Clone)]
pub struct StickerSpec {
    pub file: PathBuf,
    pub tags: Vec<String>,
}

impl StickerSpec {
    pub fn untagged(file: PathBuf) -> Self {
        Self {
            file,
            tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_record_uses_document_field_names() {
        let record = PackRecord {
            id: "pack_1".to_string(),
            name: "Cute Animals".to_string(),
            description: "Adorable".to_string(),
            pack_type: PackType::Trending,
            icon_url: "http://cdn/icon.png".to_string(),
            creator_id: "admin".to_string(),
            sticker_count: 3,
            download_count: 0,
            is_published: true,
            is_free: false,
            price: 50_000,
            created_at: 1,
            updated_at: 1,
        };

        let doc = serde_json::to_value(&record).unwrap();
        assert_eq!(doc["type"], "trending");
        assert_eq!(doc["iconUrl"], "http://cdn/icon.png");
        assert_eq!(doc["stickerCount"], 3);
        assert_eq!(doc["isFree"], false);
        assert!(doc.get("pack_type").is_none());
    }

    #[test]
    fn sticker_collection_is_nested_under_pack() {
        assert_eq!(stickers_collection("pack_ab"), "stickerPacks/pack_ab/stickers");
    }
}
