pub mod composite;
pub mod mask;
pub mod texture;
pub mod warp;

use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, RgbImage};
use tracing::{debug, info};

use crate::config::FloorConfig;
use crate::error::{FloorError, NoFloorCause, Result};
use crate::pipeline::{DebugConfig, PipelineContext, Stage};
use crate::segmentation::SegmentationMap;

/// Decode image bytes, reporting failures as fetch errors
pub fn decode_image(bytes: &[u8], what: &str) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| FloorError::Fetch(format!("failed to decode {} image: {}", what, e)))
}

/// Main floor replacement orchestrator.
///
/// Holds only configuration; every run starts from scratch.
#[derive(Debug, Clone)]
pub struct FloorPipeline {
    config: FloorConfig,
    context: PipelineContext,
}

impl FloorPipeline {
    pub fn new(config: FloorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context: PipelineContext::default(),
        })
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.context.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    /// Replace the floor in `photo` with a tiling of `tile`.
    ///
    /// Looks up the floor mask by label, then runs mask extraction, texture
    /// synthesis, perspective warping and compositing in order. The first
    /// failing stage's error is returned as is.
    pub fn run(
        &self,
        photo: &RgbImage,
        tile: &RgbImage,
        segments: &SegmentationMap,
    ) -> Result<RgbImage> {
        let started = Instant::now();
        let (width, height) = photo.dimensions();
        self.context
            .save_stage(Stage::Input, || DynamicImage::ImageRgb8(photo.clone()))?;

        let label = &self.config.floor_label;
        let raw_mask = segments.get(label).ok_or_else(|| {
            FloorError::NoFloorDetected(NoFloorCause::MissingLabel(label.clone()))
        })?;
        debug!(
            label = %label,
            mask_w = raw_mask.width(),
            mask_h = raw_mask.height(),
            width,
            height,
            "found floor mask"
        );

        // Step 1: Dominant floor region
        let region = mask::extract_floor_region(raw_mask, width, height, self.config.mask_threshold)?;
        self.context
            .save_stage(Stage::Mask, || DynamicImage::ImageLuma8(region.mask.clone()))?;

        // Geometry is checked before any texture work is done
        let quad = warp::oriented_quad(&region.contour)?;
        debug!(corners = ?quad.corners, "oriented floor quad");

        // Step 2: Tiled texture at photo size
        let texture = texture::synthesize(tile, width, height, self.config.tile_size)?;
        self.context
            .save_stage(Stage::Texture, || DynamicImage::ImageRgb8(texture.clone()))?;

        // Step 3: Perspective warp onto the floor quad
        let src = warp::texture_corners(texture.width(), texture.height());
        let homography = warp::Homography::from_correspondences(&src, &quad.corners)?;
        let warped = warp::warp_texture(&texture, &homography, width, height)?;
        self.context
            .save_stage(Stage::Warped, || DynamicImage::ImageRgb8(warped.clone()))?;

        // Step 4: Composite and blend
        let final_image =
            composite::composite(photo, &region.mask, &warped, self.config.blend_alpha)?;
        self.context
            .save_stage(Stage::Final, || DynamicImage::ImageRgb8(final_image.clone()))?;

        info!(
            width,
            height,
            floor_area = region.contour.area(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "floor replaced"
        );
        Ok(final_image)
    }

    /// Decode photo and tile bytes, then [`run`](Self::run).
    /// The tile's alpha channel, if any, is dropped.
    pub fn run_encoded(
        &self,
        photo: &[u8],
        tile: &[u8],
        segments: &SegmentationMap,
    ) -> Result<RgbImage> {
        let photo = decode_image(photo, "photo")?.to_rgb8();
        let tile = decode_image(tile, "tile")?.to_rgb8();
        self.run(&photo, &tile, segments)
    }
}

impl Default for FloorPipeline {
    fn default() -> Self {
        Self {
            config: FloorConfig::default(),
            context: PipelineContext::default(),
        }
    }
}
