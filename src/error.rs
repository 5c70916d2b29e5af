// THEORY:
// Two error families live here. `CompareError` covers precondition failures of the
// pure comparison engine: the engine never pads, crops or clamps, so every one of
// these is fatal for the inputs that produced it. `CaseError` covers everything the
// surrounding batch layers can hit while turning folders on disk into comparisons.

use std::path::PathBuf;

/// Width and height of an image or raster, in pixels.
pub type Dimensions = (u32, u32);

/// Precondition failures of the comparison engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// The two images being compared do not share the same width and height.
    #[error("images must have the same dimensions: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch { left: Dimensions, right: Dimensions },

    /// A negative sensitivity threshold was supplied.
    #[error("threshold must be non-negative, got {0}")]
    InvalidThreshold(i64),

    /// A sample buffer does not hold exactly `width * height` samples.
    #[error("buffer of {len} samples does not match a {width}x{height} grid")]
    BufferSizeMismatch { width: u32, height: u32, len: usize },
}

/// Failures while discovering, loading, comparing or persisting a test case.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Compare(#[from] CompareError),

    /// A test-case folder must contain exactly two images.
    #[error("folder {} should contain exactly 2 images, found {found}", folder.display())]
    ImageCount { folder: PathBuf, found: usize },

    #[error("summary serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking comparison worker panicked or was cancelled.
    #[error("comparison worker failed: {0}")]
    Worker(String),
}
