use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;

use crate::detect::format::{detect_image_format, ImageFormat};

/// A fetched payload that decoded into an image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub url: String,
    pub format: ImageFormat,
    pub byte_len: usize,
    pub width: u32,
    pub height: u32,
}

/// Fully decode `data`. CPU-bound; call off the async executor.
pub fn decode_image(url: &str, data: &[u8]) -> Result<LoadedImage> {
    let format = detect_image_format(data);
    let img = image::load_from_memory(data)
        .with_context(|| format!("not a decodable image: {} ({} bytes)", url, data.len()))?;
    Ok(LoadedImage {
        url: url.to_string(),
        format,
        byte_len: data.len(),
        width: img.width(),
        height: img.height(),
    })
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;

    /// Fetch `url` and decode it on the blocking pool.
    async fn load(&self, url: &str) -> Result<LoadedImage> {
        let data = self.fetch(url).await?;
        let url = url.to_string();
        tokio::task::spawn_blocking(move || decode_image(&url, &data))
            .await
            .map_err(|e| anyhow!("decode task aborted: {}", e))?
    }
}
