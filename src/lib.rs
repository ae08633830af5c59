pub mod config;
pub mod error;
pub mod floor;
pub mod models;
pub mod pipeline;
pub mod segmentation;
pub mod service;

pub use config::FloorConfig;
pub use error::{FloorError, NoFloorCause, Result};
pub use floor::FloorPipeline;
pub use models::{Contour, OrientedQuad};
pub use pipeline::{DebugConfig, PipelineContext, Stage};
pub use segmentation::{SegmentRecord, SegmentationMap};
pub use service::{FloorService, ProcessOutcome};
