use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FloorError, Result};

/// One region reported by the segmentation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub label: String,
    /// Base64-encoded mask image
    pub mask: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Either a list of segments or the error object the inference endpoint
/// returns while a model is unavailable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelResponse {
    Segments(Vec<SegmentRecord>),
    Failure { error: String },
}

/// Parse a raw model response into typed records.
pub fn parse_records(json: &[u8]) -> Result<Vec<SegmentRecord>> {
    match serde_json::from_slice::<ModelResponse>(json) {
        Ok(ModelResponse::Segments(records)) => Ok(records),
        Ok(ModelResponse::Failure { error }) => Err(FloorError::Segmentation(format!(
            "model returned an error: {}",
            error
        ))),
        Err(_) => {
            // Re-parse strictly to report which field is missing or mistyped
            let detail = serde_json::from_slice::<Vec<SegmentRecord>>(json)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unrecognized response".to_string());
            Err(FloorError::Segmentation(format!("malformed response: {}", detail)))
        }
    }
}

/// Decode a base64 mask image into a single-channel grid.
pub fn decode_mask(encoded: &str) -> Result<GrayImage> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| FloorError::Segmentation(format!("mask is not valid base64: {}", e)))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| FloorError::Segmentation(format!("mask is not a decodable image: {}", e)))?;
    Ok(img.to_luma8())
}

/// Masks keyed by label, built once per request.
#[derive(Debug, Clone, Default)]
pub struct SegmentationMap {
    masks: HashMap<String, GrayImage>,
}

impl SegmentationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every record. When a label repeats, the first record wins.
    pub fn from_records(records: &[SegmentRecord]) -> Result<Self> {
        let mut map = Self::new();
        for record in records {
            if map.masks.contains_key(&record.label) {
                debug!(label = %record.label, "ignoring repeated segment label");
                continue;
            }
            let mask = decode_mask(&record.mask).map_err(|e| match e {
                FloorError::Segmentation(msg) => {
                    FloorError::Segmentation(format!("segment '{}': {}", record.label, msg))
                }
                other => other,
            })?;
            map.masks.insert(record.label.clone(), mask);
        }
        Ok(map)
    }

    /// Build from already-decoded masks. The first mask of a label wins.
    pub fn from_masks<I, S>(masks: I) -> Self
    where
        I: IntoIterator<Item = (S, GrayImage)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (label, mask) in masks {
            map.masks.entry(label.into()).or_insert(mask);
        }
        map
    }

    pub fn get(&self, label: &str) -> Option<&GrayImage> {
        self.masks.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.masks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}
