use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::{records, thumbnail::ThumbnailDeriver};
use crate::{
    error::{AppError, AppResult, UploadError},
    models::{stickers_collection, PackRecord, PackSpec, StickerRecord, StickerSpec, PACKS_COLLECTION},
    storage::{AssetUploader, DocumentStore},
};

/// Where a pack import stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    IconPending,
    StickersPending,
    RecordsPersisting,
}

#[derive(Debug)]
pub enum AbortReason {
    IconMissing(PathBuf),
    IconUpload(UploadError),
    NoStickers,
    PackWrite(AppError),
}

impl AbortReason {
    pub fn phase(&self) -> ImportPhase {
        match self {
            AbortReason::IconMissing(_) | AbortReason::IconUpload(_) => ImportPhase::IconPending,
            AbortReason::NoStickers => ImportPhase::StickersPending,
            AbortReason::PackWrite(_) => ImportPhase::RecordsPersisting,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::IconMissing(path) => write!(f, "icon file not found: {}", path.display()),
            AbortReason::IconUpload(e) => write!(f, "icon upload failed: {}", e),
            AbortReason::NoStickers => f.write_str("no stickers uploaded"),
            AbortReason::PackWrite(e) => write!(f, "pack document write failed: {}", e),
        }
    }
}

#[derive(Debug)]
pub struct PackReport {
    pub pack_id: String,
    pub name: String,
    pub icon_url: String,
    /// Sticker files that passed the image filter.
    pub candidates: usize,
    pub uploaded: usize,
    /// Stickers whose thumbnail fell back to the primary image.
    pub degraded_thumbnails: usize,
    pub persisted: usize,
    pub write_failures: usize,
    /// `stickerCount` as last written to the pack document.
    pub sticker_count: u32,
}

#[derive(Debug)]
pub struct AbortReport {
    pub name: String,
    pub reason: AbortReason,
    pub discarded: usize,
    pub orphaned: Vec<String>,
}

#[derive(Debug)]
pub enum PackOutcome {
    Done(PackReport),
    Aborted(AbortReport),
}

impl PackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PackOutcome::Done(_))
    }

    pub fn name(&self) -> &str {
        match self {
            PackOutcome::Done(report) => &report.name,
            PackOutcome::Aborted(report) => &report.name,
        }
    }
}

impl fmt::Display for PackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackOutcome::Done(r) => {
                writeln!(f, "Pack '{}' imported (ID: {})", r.name, r.pack_id)?;
                writeln!(f, "  Icon URL: {}", r.icon_url)?;
                writeln!(f, "  Stickers uploaded: {}/{}", r.uploaded, r.candidates)?;
                if r.degraded_thumbnails > 0 {
                    writeln!(f, "  Thumbnails reusing image: {}", r.degraded_thumbnails)?;
                }
                write!(
                    f,
                    "  Sticker documents: {}/{}",
                    r.persisted,
                    r.persisted + r.write_failures
                )
            }
            PackOutcome::Aborted(r) => {
                write!(f, "Pack '{}' failed: {}", r.name, r.reason)?;
                if !r.orphaned.is_empty() {
                    write!(f, " ({} orphaned objects)", r.orphaned.len())?;
                }
                Ok(())
            }
        }
    }
}

/// One sticker that made it through upload.
struct Survivor {
    record: StickerRecord,
    degraded: bool,
}

/// Drives the import of one pack: icon, stickers, then documents.
pub struct PackImporter {
    uploader: Arc<dyn AssetUploader>,
    store: Arc<dyn DocumentStore>,
    thumbnails: ThumbnailDeriver,
    owner_id: String,
}

impl PackImporter {
    pub fn new(
        uploader: Arc<dyn AssetUploader>,
        store: Arc<dyn DocumentStore>,
        thumbnails: ThumbnailDeriver,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            uploader,
            store,
            thumbnails,
            owner_id: owner_id.into(),
        }
    }

    pub async fn import(&self, spec: &PackSpec) -> PackOutcome {
        let pack_id = records::new_pack_id();
        tracing::info!("Importing pack '{}' as {}", spec.name, pack_id);

        if !spec.icon.is_file() {
            return self
                .abort(spec, AbortReason::IconMissing(spec.icon.clone()), Vec::new())
                .await;
        }

        // Icon
        let icon_url = match self.uploader.upload(&spec.icon, &self.owner_id).await {
            Ok(url) => url,
            Err(e) => return self.abort(spec, AbortReason::IconUpload(e), Vec::new()).await,
        };
        tracing::info!("Uploaded icon: {}", icon_url);
        let mut uploaded = vec![icon_url.clone()];

        // Stickers
        let candidates: Vec<&StickerSpec> = spec
            .stickers
            .iter()
            .filter(|sticker| {
                let keep = records::is_image_path(&sticker.file);
                if !keep {
                    tracing::debug!("Skipping non-image file {}", sticker.file.display());
                }
                keep
            })
            .collect();
        tracing::info!("Found {} stickers", candidates.len());

        let mut survivors = Vec::with_capacity(candidates.len());
        for (idx, sticker) in candidates.iter().enumerate() {
            tracing::info!(
                "[{}/{}] Processing {}",
                idx + 1,
                candidates.len(),
                sticker.file.display()
            );
            if let Some(survivor) = self.import_sticker(&pack_id, spec, sticker, &mut uploaded).await {
                survivors.push(survivor);
            }
        }

        if survivors.is_empty() {
            return self.abort(spec, AbortReason::NoStickers, uploaded).await;
        }

        // Records
        let degraded_thumbnails = survivors.iter().filter(|s| s.degraded).count();
        let stickers: Vec<StickerRecord> = survivors.into_iter().map(|s| s.record).collect();

        let mut pack = records::build_pack(
            &pack_id,
            spec,
            icon_url.clone(),
            &self.owner_id,
            stickers.len() as u32,
        );
        if let Err(e) = self.write_pack(&pack).await {
            return self.abort(spec, AbortReason::PackWrite(e), uploaded).await;
        }
        tracing::info!("Pack document created");

        let collection = stickers_collection(&pack_id);
        let mut persisted = 0usize;
        let mut write_failures = 0usize;
        for record in &stickers {
            match self.write(&collection, &record.id, record).await {
                Ok(()) => persisted += 1,
                Err(e) => {
                    tracing::error!("Failed to create sticker document {}: {}", record.id, e);
                    write_failures += 1;
                }
            }
        }
        tracing::info!("Created {}/{} sticker documents", persisted, stickers.len());

        if write_failures > 0 {
            pack.sticker_count = persisted as u32;
            pack.updated_at = records::now_millis();
            match self.write_pack(&pack).await {
                Ok(()) => tracing::info!("Reconciled stickerCount to {}", persisted),
                Err(e) => tracing::error!(
                    "Failed to reconcile stickerCount for {}: {} (stored value overstates by {})",
                    pack_id,
                    e,
                    write_failures
                ),
            }
        }

        PackOutcome::Done(PackReport {
            pack_id,
            name: spec.name.clone(),
            icon_url,
            candidates: candidates.len(),
            uploaded: stickers.len(),
            degraded_thumbnails,
            persisted,
            write_failures,
            sticker_count: pack.sticker_count,
        })
    }

    /// Upload one sticker and its thumbnail. `None` means the item is skipped.
    async fn import_sticker(
        &self,
        pack_id: &str,
        spec: &PackSpec,
        sticker: &StickerSpec,
        uploaded: &mut Vec<String>,
    ) -> Option<Survivor> {
        let image_url = match self.uploader.upload(&sticker.file, &self.owner_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", sticker.file.display(), e);
                return None;
            }
        };
        uploaded.push(image_url.clone());

        let thumbnail_url = match self.thumbnails.derive(&sticker.file).await {
            Ok(scratch) => match self.uploader.upload(scratch.path(), &self.owner_id).await {
                Ok(url) => {
                    uploaded.push(url.clone());
                    Some(url)
                }
                Err(e) => {
                    tracing::warn!("Thumbnail upload failed for {}: {}", sticker.file.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Thumbnail failed for {}: {}", sticker.file.display(), e);
                None
            }
        };

        let degraded = thumbnail_url.is_none();
        let thumbnail_url = thumbnail_url.unwrap_or_else(|| image_url.clone());

        let record = records::build_sticker(
            pack_id,
            image_url,
            thumbnail_url,
            records::extension_of(&sticker.file),
            &self.owner_id,
            records::merge_tags(&spec.tags, &sticker.tags),
        );

        Some(Survivor { record, degraded })
    }

    async fn write_pack(&self, pack: &PackRecord) -> AppResult<()> {
        self.write(PACKS_COLLECTION, &pack.id, pack).await
    }

    async fn write<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> AppResult<()> {
        let data = serde_json::to_value(doc)?;
        self.store.set_document(collection, id, data).await
    }

    async fn abort(&self, spec: &PackSpec, reason: AbortReason, uploaded: Vec<String>) -> PackOutcome {
        tracing::warn!("Aborting pack '{}': {}", spec.name, reason);

        let mut discarded = 0usize;
        let mut orphaned = Vec::new();
        for url in uploaded {
            match self.uploader.discard(&url).await {
                Ok(()) => discarded += 1,
                Err(UploadError::Unsupported) => orphaned.push(url),
                Err(e) => {
                    tracing::warn!("Failed to discard {}: {}", url, e);
                    orphaned.push(url);
                }
            }
        }
        if !orphaned.is_empty() {
            tracing::warn!(
                "{} uploaded objects left orphaned for pack '{}'",
                orphaned.len(),
                spec.name
            );
        }

        PackOutcome::Aborted(AbortReport {
            name: spec.name.clone(),
            reason,
            discarded,
            orphaned,
        })
    }
}
