// THEORY:
// The `batch` module is the parallel driver around the comparison engine. Each test
// case is an independent unit of work (load two images, compare, write two result
// files), so cases are fanned out to tokio's blocking pool with a bounded number in
// flight at once. Results are collected with `buffered`, which preserves discovery
// order, so the summary is identical no matter how the workers were scheduled.
//
// A broken test case (wrong image count, undecodable file, mismatched dimensions) is
// logged and skipped rather than aborting the whole run. Only failures of the batch
// itself (missing root, unwritable results folder) are returned as errors.

use crate::core_modules::change_analyzer::ChangeRecord;
use crate::core_modules::utils::image_helper::image_helper::{load_grayscale, save_difference};
use crate::core_modules::utils::report_writer::{save_changes_csv, save_summary_json};
use crate::error::CaseError;
use crate::pipeline::{ComparisonPipeline, PipelineConfig};
use crate::test_cases::{RESULTS_FOLDER_NAME, TestCase, discover_test_cases};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Settings for one batch run over a root folder of test cases.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub root: PathBuf,
    pub results_dir: PathBuf,
    pub pipeline: PipelineConfig,
    /// Maximum number of comparisons in flight at once.
    pub jobs: usize,
    /// Where to write a JSON summary of every processed case, if anywhere.
    pub summary_path: Option<PathBuf>,
}

impl BatchConfig {
    /// A default configuration for `root`, writing into `root/results`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            results_dir: root.join(RESULTS_FOLDER_NAME),
            root,
            pipeline: PipelineConfig::default(),
            jobs: num_cpus::get(),
            summary_path: None,
        }
    }
}

/// The result of one successfully processed test case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub num_changes: usize,
    pub changes: Vec<ChangeRecord>,
    pub diff_image: PathBuf,
    pub changes_csv: PathBuf,
}

/// Compares a single test case and writes its diff image and CSV into `results_dir`.
pub fn process_test_case(
    case: &TestCase,
    pipeline: &ComparisonPipeline,
    results_dir: &Path,
) -> Result<CaseOutcome, CaseError> {
    let (first, second) = case.image_pair()?;
    let image_a = load_grayscale(&first)?;
    let image_b = load_grayscale(&second)?;

    let comparison = pipeline.compare(&image_a, &image_b)?;

    let diff_image = results_dir.join(format!("{}_diff.png", case.name));
    save_difference(&diff_image, &comparison.raster)?;

    let changes_csv = results_dir.join(format!("{}_changes.csv", case.name));
    save_changes_csv(&changes_csv, &comparison.report)?;

    info!(
        case = %case.name,
        changes = comparison.report.num_changes(),
        "processed test case"
    );

    Ok(CaseOutcome {
        name: case.name.clone(),
        num_changes: comparison.report.num_changes(),
        changes: comparison.report.into_changes(),
        diff_image,
        changes_csv,
    })
}

/// Processes every test case under `config.root` and returns the successful outcomes
/// in discovery order.
pub async fn run_batch(config: &BatchConfig) -> Result<Vec<CaseOutcome>, CaseError> {
    tokio::fs::create_dir_all(&config.results_dir).await?;

    let cases = discover_test_cases(&config.root)?;
    info!(
        root = %config.root.display(),
        cases = cases.len(),
        jobs = config.jobs,
        "starting batch"
    );

    let pipeline = Arc::new(ComparisonPipeline::new(config.pipeline.clone()));
    let results_dir: Arc<Path> = Arc::from(config.results_dir.as_path());

    let results: Vec<(String, Result<CaseOutcome, CaseError>)> = stream::iter(cases)
        .map(|case| {
            let pipeline = Arc::clone(&pipeline);
            let results_dir = Arc::clone(&results_dir);
            async move {
                let name = case.name.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_test_case(&case, &pipeline, &results_dir)
                })
                .await
                .unwrap_or_else(|join_error| Err(CaseError::Worker(join_error.to_string())));
                (name, result)
            }
        })
        .buffered(config.jobs.max(1))
        .collect()
        .await;

    let mut outcomes = Vec::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => warn!(case = %name, %error, "skipping test case"),
        }
    }

    if let Some(summary_path) = &config.summary_path {
        save_summary_json(summary_path, &outcomes)?;
        info!(path = %summary_path.display(), "wrote batch summary");
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::fs;

    /// Writes a 32x32 gray scene to `path`, with a bright `side`x`side` square at (2, 2).
    fn write_scene(path: &Path, side: u32) {
        GrayImage::from_fn(32, 32, |x, y| {
            let inside = x >= 2 && x < 2 + side && y >= 2 && y < 2 + side;
            Luma([if inside { 250 } else { 10 }])
        })
        .save(path)
        .unwrap();
    }

    fn make_case(root: &Path, name: &str, sides: (u32, u32)) -> PathBuf {
        let folder = root.join(name);
        fs::create_dir(&folder).unwrap();
        write_scene(&folder.join("a.png"), sides.0);
        write_scene(&folder.join("b.png"), sides.1);
        folder
    }

    #[test]
    fn processes_a_single_case() {
        let root = tempfile::tempdir().unwrap();
        make_case(root.path(), "square", (0, 8));
        let results_dir = root.path().join("out");
        fs::create_dir(&results_dir).unwrap();

        let case = TestCase {
            name: "square".to_string(),
            folder: root.path().join("square"),
        };
        let outcome =
            process_test_case(&case, &ComparisonPipeline::default(), &results_dir).unwrap();

        assert_eq!(outcome.num_changes, 1);
        assert_eq!(outcome.changes[0].pixels, 64);
        assert_eq!(outcome.diff_image, results_dir.join("square_diff.png"));
        assert_eq!(
            fs::read_to_string(&outcome.changes_csv).unwrap(),
            "change_id,pixels\n1,64\n"
        );
        let diff = load_grayscale(&outcome.diff_image).unwrap();
        assert_eq!(diff.get(2, 2), Some(240));
        assert_eq!(diff.get(20, 20), Some(0));
    }

    #[tokio::test]
    async fn batch_skips_broken_cases_and_keeps_order() {
        let root = tempfile::tempdir().unwrap();
        make_case(root.path(), "b_large", (0, 10));
        make_case(root.path(), "a_small", (0, 5));
        let lonely = root.path().join("c_lonely");
        fs::create_dir(&lonely).unwrap();
        write_scene(&lonely.join("only.png"), 4);

        let mut config = BatchConfig::new(root.path());
        config.jobs = 2;
        config.summary_path = Some(root.path().join("summary.json"));

        let outcomes = run_batch(&config).await.unwrap();

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a_small", "b_large"]);
        // A 5x5 square is 25 pixels, below the default floor of 50.
        assert_eq!(outcomes[0].num_changes, 0);
        assert_eq!(outcomes[1].num_changes, 1);
        assert_eq!(outcomes[1].changes[0].pixels, 100);

        let results_dir = root.path().join(RESULTS_FOLDER_NAME);
        assert!(results_dir.join("a_small_diff.png").is_file());
        assert!(results_dir.join("b_large_changes.csv").is_file());
        assert!(!results_dir.join("c_lonely_diff.png").exists());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary.as_array().unwrap().len(), 2);
        assert_eq!(summary[1]["name"], "b_large");
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("mismatch");
        fs::create_dir(&folder).unwrap();
        GrayImage::new(10, 10).save(folder.join("a.png")).unwrap();
        GrayImage::new(12, 10).save(folder.join("b.png")).unwrap();

        let outcomes = run_batch(&BatchConfig::new(root.path())).await.unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn missing_root_fails_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let mut config = BatchConfig::new(root.path().join("absent"));
        config.results_dir = root.path().join("results");
        assert!(run_batch(&config).await.is_err());
    }
}
