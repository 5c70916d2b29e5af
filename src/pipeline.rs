// THEORY:
// The `pipeline` module is the top-level API of the comparison engine. It encapsulates
// the two analytical stages into a single, easy-to-use interface:
//
//   IntensityImage x2 --(difference_map)--> DifferenceRaster --(change_analyzer)--> ChangeReport
//
// Policy (threshold, minimum change area) lives in `PipelineConfig` and is handed to
// the stages explicitly, so the same engine can be reused with different policies.
// The pipeline itself holds no per-comparison state: `compare` takes `&self` and can
// be shared freely across worker threads.

use crate::core_modules::change_analyzer::{DEFAULT_MIN_AREA, analyze_changes};
use crate::core_modules::difference_map::compute_difference;
use crate::core_modules::intensity_image::IntensityImage;
use crate::error::CompareError;
use tracing::debug;

// Re-export key data structures for the public API.
pub use crate::core_modules::change_analyzer::{ChangeRecord, ChangeReport};
pub use crate::core_modules::component_labeler::BoundingBox;
pub use crate::core_modules::difference_map::{DifferenceRaster, Threshold};

/// Default sensitivity: differences must exceed this to be significant.
pub const DEFAULT_THRESHOLD: Threshold = Threshold::new(50);

/// Configuration for the ComparisonPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub threshold: Threshold,
    /// Changes must cover strictly more than this many pixels to be reported.
    pub min_area: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

/// Everything produced by one comparison.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub raster: DifferenceRaster,
    pub report: ChangeReport,
}

/// The main, top-level struct for the comparison engine.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPipeline {
    config: PipelineConfig,
}

impl ComparisonPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn compare(
        &self,
        image_a: &IntensityImage,
        image_b: &IntensityImage,
    ) -> Result<Comparison, CompareError> {
        // Stage 1: Pixel-level difference with noise suppression
        let raster = compute_difference(image_a, image_b, self.config.threshold)?;

        // Stage 2: Spatial grouping and area filtering
        let report = analyze_changes(&raster, self.config.min_area);

        debug!(
            width = raster.width(),
            height = raster.height(),
            foreground = raster.foreground_count(),
            changes = report.num_changes(),
            "comparison complete"
        );

        Ok(Comparison { raster, report })
    }
}
