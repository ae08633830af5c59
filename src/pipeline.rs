use image::DynamicImage;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{FloorError, Result};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Mask,
    Texture,
    Warped,
    Final,
}

impl Stage {
    pub fn index(self) -> usize {
        match self {
            Stage::Input => 0,
            Stage::Mask => 1,
            Stage::Texture => 2,
            Stage::Warped => 3,
            Stage::Final => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Mask => "mask",
            Stage::Texture => "texture",
            Stage::Warped => "warped",
            Stage::Final => "final",
        }
    }

    /// Debug dump file name, e.g. "02_texture.png"
    pub fn filename(self) -> String {
        format!("{:02}_{}.png", self.index(), self.name())
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one image per stage
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir).map_err(|e| {
                FloorError::InvalidConfig(format!(
                    "cannot read debug directory {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
            if entries.next().is_some() {
                return Err(FloorError::InvalidConfig(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| {
                FloorError::InvalidConfig(format!(
                    "cannot create debug directory {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
        }
        Ok(Self { output_dir })
    }
}

/// Context shared by every stage of one run
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Save a stage's intermediate image if debug mode is enabled.
    /// The image is only materialized when it will be written.
    pub fn save_stage<F>(&self, stage: Stage, image: F) -> Result<()>
    where
        F: FnOnce() -> DynamicImage,
    {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };

        let path = debug_config.output_dir.join(stage.filename());
        image().save(&path).map_err(|e| {
            FloorError::Internal(format!("failed to save debug image {}: {}", path.display(), e))
        })?;
        debug!(stage = stage.name(), path = %path.display(), "saved debug image");
        Ok(())
    }
}
