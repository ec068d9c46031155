use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::{config::ImportConfig, error::ThumbnailError};

/// A file in the scratch directory, removed when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Writes bounded, aspect-preserving copies of sticker images.
#[derive(Debug, Clone)]
pub struct ThumbnailDeriver {
    scratch_dir: PathBuf,
    max_width: u32,
    max_height: u32,
}

impl ThumbnailDeriver {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            scratch_dir: config.scratch_dir.clone(),
            max_width: config.thumbnail_max_width,
            max_height: config.thumbnail_max_height,
        }
    }

    /// Scratch location for the thumbnail of `source`.
    pub fn scratch_path(&self, source: &Path) -> Result<PathBuf, ThumbnailError> {
        let name = source.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("no file name in {}", source.display()),
            )
        })?;
        Ok(self.scratch_dir.join(format!("thumb_{}", name)))
    }

    pub async fn derive(&self, source: &Path) -> Result<ScratchFile, ThumbnailError> {
        let target = self.scratch_path(source)?;
        let source = source.to_path_buf();
        let (max_width, max_height) = (self.max_width, self.max_height);

        tokio::task::spawn_blocking(move || render(&source, target, max_width, max_height)).await?
    }
}

fn render(
    source: &Path,
    target: PathBuf,
    max_width: u32,
    max_height: u32,
) -> Result<ScratchFile, ThumbnailError> {
    let reader = ImageReader::open(source)?.with_guessed_format()?;
    let format = output_format(reader.format());
    let img = reader.decode()?;

    let resized = if img.width() <= max_width && img.height() <= max_height {
        img
    } else {
        img.thumbnail(max_width, max_height)
    };

    let encoded = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => DynamicImage::ImageRgba8(resized.to_rgba8()),
    };

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir)?;
    }

    // Guard before writing so a failed encode leaves nothing behind.
    let scratch = ScratchFile { path: target };
    encoded.save_with_format(scratch.path(), format)?;

    Ok(scratch)
}

fn output_format(source: Option<ImageFormat>) -> ImageFormat {
    match source {
        Some(
            format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP),
        ) => format,
        _ => ImageFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn deriver(scratch: &Path) -> ThumbnailDeriver {
        ThumbnailDeriver::new(&ImportConfig {
            scratch_dir: scratch.to_path_buf(),
            ..ImportConfig::default()
        })
    }

    #[tokio::test]
    async fn shrinks_to_fit_preserving_aspect_ratio() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("wide.png");
        RgbaImage::new(300, 150).save(&source).unwrap();

        let scratch_dir = dir.path().join("scratch");
        let thumb = deriver(&scratch_dir).derive(&source).await.unwrap();

        assert_eq!(thumb.path(), scratch_dir.join("thumb_wide.png"));
        let out = image::open(thumb.path()).unwrap();
        assert_eq!(out.dimensions(), (128, 64));
    }

    #[tokio::test]
    async fn small_images_are_not_upscaled() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("tiny.png");
        RgbaImage::new(40, 20).save(&source).unwrap();

        let thumb = deriver(dir.path()).derive(&source).await.unwrap();
        assert_eq!(image::open(thumb.path()).unwrap().dimensions(), (40, 20));
    }

    #[tokio::test]
    async fn keeps_source_encoding() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.jpg");
        DynamicImage::ImageRgba8(RgbaImage::new(256, 256))
            .to_rgb8()
            .save(&source)
            .unwrap();

        let thumb = deriver(dir.path()).derive(&source).await.unwrap();
        let reader = ImageReader::open(thumb.path())
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    }

    #[tokio::test]
    async fn scratch_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("cat.png");
        RgbaImage::new(200, 200).save(&source).unwrap();

        let thumb = deriver(dir.path()).derive(&source).await.unwrap();
        let path = thumb.path().to_path_buf();
        assert!(path.exists());

        drop(thumb);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn corrupt_image_is_a_derivation_failure() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();

        let err = deriver(dir.path()).derive(&source).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::Image(_)));
        assert!(!dir.path().join("thumb_broken.png").exists());
    }

    #[test]
    fn unknown_formats_fall_back_to_png() {
        assert_eq!(output_format(Some(ImageFormat::Bmp)), ImageFormat::Png);
        assert_eq!(output_format(None), ImageFormat::Png);
        assert_eq!(output_format(Some(ImageFormat::Gif)), ImageFormat::Gif);
    }
}
