use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::fs as async_fs;

use crate::error::{FloorError, Result};
use crate::segmentation::{SegmentRecord, parse_records};

/// Runs semantic segmentation on an encoded photo
pub trait Segmenter: Send + Sync {
    fn segment(&self, photo: &[u8]) -> impl Future<Output = Result<Vec<SegmentRecord>>> + Send;
}

/// Replays a model response saved as JSON, ignoring the photo bytes
#[derive(Debug, Clone)]
pub struct RecordedSegmenter {
    response_path: PathBuf,
}

impl RecordedSegmenter {
    pub fn new<P: AsRef<Path>>(response_path: P) -> Self {
        Self {
            response_path: response_path.as_ref().to_path_buf(),
        }
    }
}

impl Segmenter for RecordedSegmenter {
    async fn segment(&self, _photo: &[u8]) -> Result<Vec<SegmentRecord>> {
        let raw = async_fs::read(&self.response_path).await.map_err(|e| {
            FloorError::Segmentation(format!(
                "cannot read model response {}: {}",
                self.response_path.display(),
                e
            ))
        })?;
        parse_records(&raw)
    }
}
