// THEORY:
// This file is the main entry point for the `image_comp` library crate. The primary
// goal is to export the `ComparisonPipeline` and its associated data structures
// (`PipelineConfig`, `ChangeReport`, etc.) as the clean, high-level interface for the
// change-detection engine. The analytical stages live in `core_modules`; the batch
// driver and test-case discovery sit on top of them for the command-line tool.

pub mod batch;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod test_cases;

pub use core_modules::change_analyzer::{DEFAULT_MIN_AREA, analyze_changes};
pub use core_modules::difference_map::compute_difference;
pub use core_modules::intensity_image::IntensityImage;
pub use error::{CaseError, CompareError};
