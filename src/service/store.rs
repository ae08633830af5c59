use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use time::OffsetDateTime;
use time::format_description;
use tokio::fs as async_fs;
use tracing::info;
use uuid::Uuid;

use crate::error::{FloorError, Result};

/// Durable storage for final images
pub trait ResultStore: Send + Sync {
    /// Store the image and return a reference that resolves to it.
    fn put(&self, image: &RgbImage) -> impl Future<Output = Result<String>> + Send;
}

/// Writes JPEG results into a local directory and returns `file://` URLs
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name like `mask_floor_20261017_134501_<uuid>.jpg`
    fn object_name(now: OffsetDateTime) -> Result<String> {
        let format = format_description::parse("[year][month][day]_[hour][minute][second]")
            .map_err(|e| FloorError::Persistence(format!("bad timestamp format: {}", e)))?;
        let stamp = now
            .format(&format)
            .map_err(|e| FloorError::Persistence(format!("failed to format timestamp: {}", e)))?;
        Ok(format!("mask_floor_{}_{}.jpg", stamp, Uuid::new_v4()))
    }
}

fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| FloorError::Persistence(format!("failed to encode result: {}", e)))?;
    Ok(buf.into_inner())
}

impl ResultStore for LocalStore {
    async fn put(&self, image: &RgbImage) -> Result<String> {
        let bytes = encode_jpeg(image)?;
        let name = Self::object_name(OffsetDateTime::now_utc())?;

        async_fs::create_dir_all(&self.root).await.map_err(|e| {
            FloorError::Persistence(format!("cannot create {}: {}", self.root.display(), e))
        })?;
        let dest = self.root.join(&name);
        async_fs::write(&dest, &bytes)
            .await
            .map_err(|e| FloorError::Persistence(format!("failed to write {}: {}", dest.display(), e)))?;

        let absolute = async_fs::canonicalize(&dest).await.unwrap_or(dest);
        let url = format!("file://{}", absolute.display());
        info!(url = %url, bytes = bytes.len(), "stored result");
        Ok(url)
    }
}
