use std::fmt;

/// Why the pipeline concluded there is no floor to retile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoFloorCause {
    /// The segmentation output has no entry with the requested label.
    MissingLabel(String),
    /// The label was present but its mask has no foreground pixels.
    EmptyMask,
}

impl fmt::Display for NoFloorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLabel(label) => write!(f, "no segment labelled '{}'", label),
            Self::EmptyMask => write!(f, "floor mask contains no foreground pixels"),
        }
    }
}

/// Errors produced anywhere between request validation and result storage.
///
/// Each stage reports its own class of failure; the orchestrator and the
/// service pass them through untouched.
#[derive(Debug, thiserror::Error)]
pub enum FloorError {
    /// A locator was malformed. Raised before any I/O happens.
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A source image could not be fetched or decoded.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// The segmentation model failed or returned unusable data.
    #[error("segmentation failed: {0}")]
    Segmentation(String),

    #[error("no floor detected: {0}")]
    NoFloorDetected(NoFloorCause),

    /// Zero-area contour, collinear corners or a singular transform.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The result store rejected the write.
    #[error("failed to persist result: {0}")]
    Persistence(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker task died before producing a result.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FloorError {
    /// Stable tag for failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputValidation(_) => "input_validation",
            Self::Fetch(_) => "fetch",
            Self::Segmentation(_) => "segmentation",
            Self::NoFloorDetected(_) => "no_floor_detected",
            Self::DegenerateGeometry(_) => "degenerate_geometry",
            Self::Persistence(_) => "persistence",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Internal(_) => "internal",
        }
    }

    pub fn empty_mask() -> Self {
        Self::NoFloorDetected(NoFloorCause::EmptyMask)
    }

    pub fn is_empty_mask(&self) -> bool {
        matches!(self, Self::NoFloorDetected(NoFloorCause::EmptyMask))
    }
}

pub type Result<T> = std::result::Result<T, FloorError>;
