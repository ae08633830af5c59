use crate::error::{FloorError, Result};

pub const DEFAULT_FLOOR_LABEL: &str = "floor";
pub const DEFAULT_TILE_SIZE: u32 = 300;
pub const DEFAULT_BLEND_ALPHA: f32 = 0.3;
pub const DEFAULT_MASK_THRESHOLD: u8 = 127;

/// Tunables for a floor replacement run
#[derive(Debug, Clone, PartialEq)]
pub struct FloorConfig {
    /// Segmentation label treated as the floor
    pub floor_label: String,
    /// Side length the tile sample is normalized to before tiling
    pub tile_size: u32,
    /// Weight of the original photo in the final blend
    pub blend_alpha: f32,
    /// Mask values strictly above this become foreground
    pub mask_threshold: u8,
}

impl FloorConfig {
    pub fn new() -> Self {
        Self {
            floor_label: DEFAULT_FLOOR_LABEL.to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            blend_alpha: DEFAULT_BLEND_ALPHA,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
        }
    }

    pub fn with_floor_label(mut self, label: impl Into<String>) -> Self {
        self.floor_label = label.into();
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_blend_alpha(mut self, alpha: f32) -> Self {
        self.blend_alpha = alpha;
        self
    }

    pub fn with_mask_threshold(mut self, threshold: u8) -> Self {
        self.mask_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.floor_label.trim().is_empty() {
            return Err(FloorError::InvalidConfig("floor label must not be empty".into()));
        }
        if self.tile_size == 0 {
            return Err(FloorError::InvalidConfig("tile size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.blend_alpha) {
            return Err(FloorError::InvalidConfig(format!(
                "blend alpha must be within [0, 1], got {}",
                self.blend_alpha
            )));
        }
        if self.mask_threshold == u8::MAX {
            return Err(FloorError::InvalidConfig(
                "mask threshold 255 leaves no foreground value".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self::new()
    }
}
