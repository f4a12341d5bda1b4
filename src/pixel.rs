//! The pixel asset served by the tracking endpoint.
//!
//! By default the GIF is read from disk on every request, so replacing the
//! file takes effect immediately. With `pixel.preload` the bytes are read once
//! at startup and shared read-only between all requests.

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;

use crate::config::PixelConfig;

/// Source of the pixel bytes.
#[derive(Debug, Clone)]
pub enum PixelSource {
    /// Read the file at this path on every request
    Disk(PathBuf),
    /// Bytes loaded at startup
    Memory(Bytes),
}

impl PixelSource {
    /// Build the source described by the configuration.
    ///
    /// A failed preload is not fatal: the source falls back to reading from
    /// disk, so requests keep failing with a 500 until the file appears.
    pub async fn from_config(config: &PixelConfig) -> Self {
        if !config.preload {
            return Self::Disk(config.path.clone());
        }

        match Self::preload(&config.path).await {
            Ok(source) => {
                tracing::info!(path = %config.path.display(), "Preloaded pixel asset");
                source
            }
            Err(e) => {
                tracing::warn!(
                    path = %config.path.display(),
                    error = %e,
                    "Failed to preload pixel asset, reading from disk per request"
                );
                Self::Disk(config.path.clone())
            }
        }
    }

    /// Read the file now and keep its contents in memory.
    pub async fn preload(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::Memory(Bytes::from(bytes)))
    }

    /// Current pixel bytes.
    pub async fn load(&self) -> io::Result<Bytes> {
        match self {
            Self::Disk(path) => tokio::fs::read(path).await.map(Bytes::from),
            Self::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}
