// Gallery page model — feeds the active category to the preloader and shapes its state for display.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::catalog::Category;
use super::download::{DownloadOutcome, WallpaperDownloader};
use crate::api::status::GalleryStatus;
use crate::config::EngineConfig;
use crate::detect::format::ImageFormat;
use crate::engine::preloader::Preloader;
use crate::engine::state::{PreloadState, RunId};
use crate::source::traits::ImageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    pub percent: u8,
    /// Hidden once every image of the category has loaded.
    pub visible: bool,
}

/// One tile of the gallery grid. Each tile tracks its own load/error display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperCard {
    pub src: String,
    pub alt: String,
    pub index: usize,
    pub title: String,
    /// Suggested save name; the saved file takes the extension of the fetched bytes.
    pub download_file_name: String,
}

pub struct GalleryView {
    preloader: Preloader,
    downloader: WallpaperDownloader,
    active: Category,
    images: Vec<String>,
    run_id: RunId,
}

impl GalleryView {
    /// Build the gallery and start preloading the default category.
    pub fn new(source: Arc<dyn ImageSource>, config: &EngineConfig) -> Self {
        let preloader = Preloader::new(Arc::clone(&source), config.gallery_preload());
        let downloader = WallpaperDownloader::new(source, config.gallery.download_dir.clone());

        let active = Category::default();
        let images = active.images();
        let run_id = preloader.start(images.clone());
        info!("gallery opened on {} (run {})", active.key(), run_id);

        Self {
            preloader,
            downloader,
            active,
            images,
            run_id,
        }
    }

    pub fn active_category(&self) -> Category {
        self.active
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    /// Switch category. Starts a fresh preload run unless `category` is already shown.
    pub fn select_category(&mut self, category: Category) -> bool {
        if category == self.active {
            debug!("category {} already active", category.key());
            return false;
        }

        self.active = category;
        self.images = category.images();
        self.run_id = self.preloader.start(self.images.clone());
        info!("gallery switched to {} (run {})", category.key(), self.run_id);
        true
    }

    pub fn progress_bar(&self) -> ProgressBar {
        let state = self.preloader.snapshot();
        ProgressBar {
            percent: state.progress().round() as u8,
            visible: !state.all_loaded(),
        }
    }

    pub fn cards(&self) -> Vec<WallpaperCard> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, src)| WallpaperCard {
                src: src.clone(),
                alt: format!("{} wallpaper {}", self.active.key(), index + 1),
                index,
                title: format!("#{}", index + 1),
                download_file_name: WallpaperDownloader::file_name_for(
                    index,
                    ImageFormat::Jpeg,
                ),
            })
            .collect()
    }

    pub fn status(&self) -> GalleryStatus {
        GalleryStatus::from_state(self.active, &self.preloader.snapshot())
    }

    pub fn subscribe(&self) -> watch::Receiver<PreloadState> {
        self.preloader.subscribe()
    }

    /// Wait for the current category's run to settle.
    pub async fn wait_settled(&self) -> PreloadState {
        self.preloader.wait_settled(self.run_id).await
    }

    /// Download the card at `index` of the active category.
    pub async fn download(&self, index: usize) -> Option<DownloadOutcome> {
        let url = self.images.get(index)?;
        Some(self.downloader.download(url, index).await)
    }
}
