// THEORY:
// The `difference_map` module is the first analytical layer of the engine. It takes two
// `IntensityImage`s of the same shape and quantifies, pixel by pixel, how much they
// disagree. Small disagreements (sensor noise, compression artifacts) are suppressed by
// a caller-supplied `Threshold`, leaving a sparse `DifferenceRaster` where only the
// significant differences survive.
//
// Key architectural principles:
// 1.  **Fail Fast**: Mismatched dimensions are a fatal precondition violation. The
//     engine never pads, crops or otherwise reconciles the inputs.
// 2.  **Pure Per-Pixel Arithmetic**: Every output cell depends on exactly one input
//     position. The difference is the unsigned `abs_diff`, so it can never wrap.
// 3.  **Magnitude Preservation**: A surviving cell keeps its raw absolute difference
//     rather than being flattened to a binary mask, so the raster can be rendered back
//     to an image that shows *how much* each region changed.

use crate::core_modules::intensity_image::{Intensity, IntensityImage, grid_len};
use crate::error::{CompareError, Dimensions};
use image::{GrayImage, Luma};

/// Minimum absolute difference a pixel must *exceed* to count as significant.
///
/// The type does not enforce an upper bound; anything at or above 255 simply
/// suppresses every difference of 8-bit data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u32);

impl Threshold {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u8> for Threshold {
    fn from(value: u8) -> Self {
        Self(u32::from(value))
    }
}

impl TryFrom<i64> for Threshold {
    type Error = CompareError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(CompareError::InvalidThreshold(value));
        }
        Ok(Self(u32::try_from(value).unwrap_or(u32::MAX)))
    }
}

/// A sparse raster of significant differences. Each cell is either 0 (insignificant)
/// or the raw absolute difference between the two compared images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceRaster {
    width: u32,
    height: u32,
    cells: Vec<Intensity>,
}

impl DifferenceRaster {
    /// Wraps an existing row-major cell buffer, e.g. a raster that was persisted and
    /// read back.
    pub fn from_raw(width: u32, height: u32, cells: Vec<Intensity>) -> Result<Self, CompareError> {
        if cells.len() != grid_len(width, height) {
            return Err(CompareError::BufferSizeMismatch {
                width,
                height,
                len: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        (self.width, self.height)
    }

    /// The cell at `(x, y)`, or `None` when the position is outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<Intensity> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Whether the cell at `(x, y)` holds a significant difference.
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(|cell| cell != 0)
    }

    /// Number of significant (non-zero) cells.
    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    pub fn as_raw(&self) -> &[Intensity] {
        &self.cells
    }

    /// Renders the raster as an 8-bit grayscale image for persistence or display.
    pub fn to_gray_image(&self) -> GrayImage {
        let width = self.width as usize;
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([self.cells[y as usize * width + x as usize]])
        })
    }
}

/// Computes the thresholded absolute difference between two images.
///
/// A cell keeps `|a - b|` only when it is strictly greater than `threshold`;
/// otherwise it is zeroed. Fails with [`CompareError::DimensionMismatch`] when the
/// images differ in width or height.
pub fn compute_difference(
    image_a: &IntensityImage,
    image_b: &IntensityImage,
    threshold: Threshold,
) -> Result<DifferenceRaster, CompareError> {
    if image_a.dimensions() != image_b.dimensions() {
        return Err(CompareError::DimensionMismatch {
            left: image_a.dimensions(),
            right: image_b.dimensions(),
        });
    }

    let cutoff = threshold.value();
    let cells = image_a
        .as_raw()
        .iter()
        .zip(image_b.as_raw())
        .map(|(&left, &right)| {
            let delta = left.abs_diff(right);
            if u32::from(delta) > cutoff { delta } else { 0 }
        })
        .collect();

    Ok(DifferenceRaster {
        width: image_a.width(),
        height: image_a.height(),
        cells,
    })
}
