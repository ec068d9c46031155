use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{PackRecord, PackSpec, StickerRecord};

/// Extensions accepted as sticker candidates.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

const ANIMATED_EXTENSIONS: [&str; 2] = ["webp", "gif"];

pub fn new_pack_id() -> String {
    format!("pack_{}", Uuid::new_v4().simple())
}

pub fn new_sticker_id() -> String {
    format!("sticker_{}", Uuid::new_v4().simple())
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Extension of `path` without the leading dot, as written on disk.
pub fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

pub fn is_image_path(path: &Path) -> bool {
    let ext = extension_of(path);
    IMAGE_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

pub fn is_animated(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.');
    ANIMATED_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

pub fn format_tag(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_uppercase()
}

/// Pack tags followed by item tags, first occurrence wins.
pub fn merge_tags(pack_tags: &[String], item_tags: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(pack_tags.len() + item_tags.len());
    for tag in pack_tags.iter().chain(item_tags) {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

pub fn build_sticker(
    pack_id: &str,
    image_url: String,
    thumbnail_url: String,
    extension: &str,
    owner_id: &str,
    tags: Vec<String>,
) -> StickerRecord {
    StickerRecord {
        id: new_sticker_id(),
        pack_id: pack_id.to_string(),
        image_url,
        thumbnail_url,
        is_animated: is_animated(extension),
        format: format_tag(extension),
        creator_id: owner_id.to_string(),
        tags,
        created_at: now_millis(),
    }
}

pub fn build_pack(
    pack_id: &str,
    spec: &PackSpec,
    icon_url: String,
    owner_id: &str,
    sticker_count: u32,
) -> PackRecord {
    let now = now_millis();

    PackRecord {
        id: pack_id.to_string(),
        name: spec.name.clone(),
        description: spec.description.clone(),
        pack_type: spec.pack_type,
        icon_url,
        creator_id: owner_id.to_string(),
        sticker_count,
        download_count: 0,
        is_published: true,
        is_free: spec.pricing.is_free,
        price: spec.pricing.price,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::models::{PackType, Pricing};

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn only_gif_and_webp_are_animated() {
        for ext in ["gif", "GIF", "webp", "WebP", ".gif"] {
            assert!(is_animated(ext), "{ext} should be animated");
        }
        for ext in ["png", "PNG", "jpg", "jpeg", "JPEG", ""] {
            assert!(!is_animated(ext), "{ext} should be static");
        }
    }

    #[test]
    fn format_is_uppercased_extension() {
        assert_eq!(format_tag("png"), "PNG");
        assert_eq!(format_tag(".jpeg"), "JPEG");
        assert_eq!(format_tag("WebP"), "WEBP");
    }

    #[test]
    fn image_filter_ignores_case() {
        assert!(is_image_path(Path::new("a/cat.PNG")));
        assert!(is_image_path(Path::new("dog.Jpeg")));
        assert!(!is_image_path(Path::new("readme.txt")));
        assert!(!is_image_path(Path::new("png")));
        assert!(!is_image_path(Path::new("archive.png.zip")));
    }

    #[test]
    fn merged_tags_drop_duplicates_in_first_seen_order() {
        let merged = merge_tags(&tags(&["cute", "animal"]), &tags(&["cat", "cute"]));
        assert_eq!(merged, tags(&["cute", "animal", "cat"]));
        assert!(merge_tags(&[], &[]).is_empty());
    }

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_sticker_id();
        let b = new_sticker_id();
        assert!(a.starts_with("sticker_"));
        assert!(new_pack_id().starts_with("pack_"));
        assert_ne!(a, b);
    }

    #[test]
    fn sticker_record_derives_fields_from_extension() {
        let record = build_sticker(
            "pack_1",
            "https://cdn/a.gif".to_string(),
            "https://cdn/thumb_a.gif".to_string(),
            "GIF",
            "admin",
            tags(&["party"]),
        );

        assert_eq!(record.pack_id, "pack_1");
        assert!(record.is_animated);
        assert_eq!(record.format, "GIF");
        assert_eq!(record.creator_id, "admin");
        assert_eq!(record.tags, tags(&["party"]));
        assert!(record.created_at > 0);
    }

    #[test]
    fn pack_record_carries_spec_metadata() {
        let spec = PackSpec {
            name: "Cute Animals".to_string(),
            description: "Adorable".to_string(),
            pack_type: PackType::User,
            icon: PathBuf::from("icon.png"),
            tags: Vec::new(),
            pricing: Pricing::paid(50_000),
            stickers: Vec::new(),
        };

        let record = build_pack("pack_1", &spec, "https://cdn/icon.png".to_string(), "admin", 7);

        assert_eq!(record.sticker_count, 7);
        assert_eq!(record.download_count, 0);
        assert!(record.is_published);
        assert!(!record.is_free);
        assert_eq!(record.price, 50_000);
        assert_eq!(record.pack_type, PackType::User);
        assert_eq!(record.created_at, record.updated_at);
    }
}
