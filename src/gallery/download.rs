// Wallpaper download action — saves one image to disk, falls back to opening it directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::detect::format::{detect_image_format, ImageFormat};
use crate::source::traits::ImageSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The image was written to this path.
    Saved(PathBuf),
    /// Saving failed; the host should open this URL in a new view instead.
    OpenExternally(String),
}

pub struct WallpaperDownloader {
    source: Arc<dyn ImageSource>,
    download_dir: PathBuf,
}

impl WallpaperDownloader {
    pub fn new(source: Arc<dyn ImageSource>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// File name the wallpaper at `index` is saved under. Unrecognised payloads keep `.jpg`.
    pub fn file_name_for(index: usize, format: ImageFormat) -> String {
        let format = if format.is_known() { format } else { ImageFormat::Jpeg };
        format!("wallpaper-{}.{}", index + 1, format.extension())
    }

    /// Save `url` as the wallpaper at `index`. Never fails: errors turn into the fallback.
    pub async fn download(&self, url: &str, index: usize) -> DownloadOutcome {
        match self.save(url, index).await {
            Ok(path) => {
                info!("wallpaper saved url={} path={}", url, path.display());
                DownloadOutcome::Saved(path)
            }
            Err(e) => {
                warn!("download failed, falling back to direct open: {}: {:#}", url, e);
                DownloadOutcome::OpenExternally(url.to_string())
            }
        }
    }

    async fn save(&self, url: &str, index: usize) -> Result<PathBuf> {
        let data = self.source.fetch(url).await?;

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| format!("create {}", self.download_dir.display()))?;

        let format = detect_image_format(&data);
        let path = self.download_dir.join(Self::file_name_for(index, format));
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(
            "wrote {} bytes as {} to {}",
            data.len(),
            format.mime_type(),
            path.display()
        );

        Ok(path)
    }
}
