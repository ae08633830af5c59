//! Request/response shell around [`FloorPipeline`].
//!
//! The shell validates locators, drives the three collaborators (image
//! source, segmenter, result store) and runs the blocking pipeline on a
//! worker thread. Collaborators are constructed once by the caller and
//! passed in; the service only ever reads them.

pub mod locator;
pub mod segmenter;
pub mod source;
pub mod store;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FloorError, Result};
use crate::floor::FloorPipeline;
use crate::segmentation::SegmentationMap;

pub use locator::{Locator, Scheme};
pub use segmenter::{RecordedSegmenter, Segmenter};
pub use source::{FsImageSource, ImageSource};
pub use store::{LocalStore, ResultStore};

/// Wire shape of a processed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    Success { uploaded_image_url: String },
    Failure { error: String, detail: String },
}

impl From<Result<String>> for ProcessOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(url) => ProcessOutcome::Success {
                uploaded_image_url: url,
            },
            Err(e) => ProcessOutcome::Failure {
                error: e.kind().to_string(),
                detail: e.to_string(),
            },
        }
    }
}

pub struct FloorService<S, G, P> {
    source: S,
    segmenter: G,
    store: P,
    pipeline: FloorPipeline,
}

impl<S, G, P> FloorService<S, G, P>
where
    S: ImageSource,
    G: Segmenter,
    P: ResultStore,
{
    pub fn new(source: S, segmenter: G, store: P, pipeline: FloorPipeline) -> Self {
        Self {
            source,
            segmenter,
            store,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &FloorPipeline {
        &self.pipeline
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Retile the floor of `photo_ref` with `tile_ref` and return a
    /// reference to the stored result.
    ///
    /// Both locators are validated before any I/O. Either a complete image
    /// is stored or an error is returned; nothing partial is persisted.
    pub async fn process(&self, photo_ref: &str, tile_ref: &str) -> Result<String> {
        let photo = Locator::parse(photo_ref)?;
        let tile = Locator::parse(tile_ref)?;
        info!(photo = %photo, tile = %tile, "processing request");

        let (photo_bytes, tile_bytes) =
            tokio::try_join!(self.source.fetch(&photo), self.source.fetch(&tile))?;

        let records = self.segmenter.segment(&photo_bytes).await?;
        info!(segments = records.len(), "segmentation finished");

        let pipeline = self.pipeline.clone();
        let final_image = tokio::task::spawn_blocking(move || {
            let segments = SegmentationMap::from_records(&records)?;
            pipeline.run_encoded(&photo_bytes, &tile_bytes, &segments)
        })
        .await
        .map_err(|e| FloorError::Internal(format!("pipeline worker failed: {}", e)))??;

        self.store.put(&final_image).await
    }

    /// [`process`](Self::process), with failures mapped to a response body
    pub async fn respond(&self, photo_ref: &str, tile_ref: &str) -> ProcessOutcome {
        let result = self.process(photo_ref, tile_ref).await;
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "request failed");
        }
        ProcessOutcome::from(result)
    }
}
