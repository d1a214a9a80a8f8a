use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Number of images loaded concurrently when the caller does not say otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Batch size the gallery uses for a category's image list.
pub const GALLERY_BATCH_SIZE: usize = 8;

/// Pause between two batches so the host's connection pool is not saturated.
pub const INTER_BATCH_DELAY_MS: u64 = 100;

/// Per-image load timeout. A hung fetch would otherwise stall every later batch.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Directory downloads land in when none is configured.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// File the user settings (intro flag) are persisted to when none is configured.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Log filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Settings for one preloader engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Maximum number of loads in flight at once (one batch).
    pub batch_size: usize,
    /// Delay inserted after a batch resolves and before the next one starts.
    pub inter_batch_delay_ms: u64,
    /// Per-load timeout; `None` waits forever.
    pub load_timeout_ms: Option<u64>,
}

impl PreloadConfig {
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Clamp values the engine cannot work with.
    pub fn validated(mut self) -> Self {
        if self.batch_size == 0 {
            tracing::warn!("batch_size 0 is invalid, using 1");
            self.batch_size = 1;
        }
        self
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: INTER_BATCH_DELAY_MS,
            load_timeout_ms: Some(DEFAULT_LOAD_TIMEOUT_MS),
        }
    }
}

/// Settings for the gallery page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub batch_size: usize,
    pub download_dir: PathBuf,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            batch_size: GALLERY_BATCH_SIZE,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }
}

/// Top-level configuration handed to the host application at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub preload: PreloadConfig,
    pub gallery: GalleryConfig,
    /// Where the persisted user settings live.
    pub settings_path: PathBuf,
    /// `EnvFilter` directives; `RUST_LOG` still wins when set.
    pub log_filter: String,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid engine config")
    }

    /// Preload settings the gallery runs with: engine defaults plus the gallery batch size.
    pub fn gallery_preload(&self) -> PreloadConfig {
        PreloadConfig {
            batch_size: self.gallery.batch_size,
            ..self.preload.clone()
        }
        .validated()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preload: PreloadConfig::default(),
            gallery: GalleryConfig::default(),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
