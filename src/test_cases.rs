// THEORY:
// A "test case" is a folder holding exactly two images to compare. All test cases live
// directly under a common root, next to a `results` folder where outputs are written.
// Discovery is deterministic: folders and images are both visited in file-name order,
// so the same tree always produces the same pairings and the same batch output.

use crate::error::CaseError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Name of the folder under the root that receives all outputs. Never a test case.
pub const RESULTS_FOLDER_NAME: &str = "results";

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A folder of two images that should be compared with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub folder: PathBuf,
}

impl TestCase {
    /// Returns the folder's two images, ordered by file name.
    pub fn image_pair(&self) -> Result<(PathBuf, PathBuf), CaseError> {
        let mut images = Vec::new();
        for entry in WalkDir::new(&self.folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && is_image_file(entry.path()) {
                images.push(entry.into_path());
            }
        }

        match <[PathBuf; 2]>::try_from(images) {
            Ok([first, second]) => Ok((first, second)),
            Err(images) => Err(CaseError::ImageCount {
                folder: self.folder.clone(),
                found: images.len(),
            }),
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Lists every immediate subfolder of `root` except the results folder.
pub fn discover_test_cases(root: &Path) -> Result<Vec<TestCase>, CaseError> {
    let mut cases = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name == RESULTS_FOLDER_NAME {
            continue;
        }

        debug!(case = %name, "discovered test case");
        cases.push(TestCase {
            name,
            folder: entry.into_path(),
        });
    }
    Ok(cases)
}
