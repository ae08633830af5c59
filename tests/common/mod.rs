mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from floortile for tests
pub use floortile::{
    FloorConfig, FloorError, FloorPipeline, NoFloorCause, SegmentRecord, SegmentationMap,
};
