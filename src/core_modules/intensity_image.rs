// THEORY:
// `IntensityImage` is the most fundamental unit of the engine: a "dumb" data container
// holding one decoded, single-channel frame. It knows its own shape and how to hand out
// its samples, nothing more. Comparing two images is the job of `difference_map`.
//
// Samples are stored row-major in a flat `Vec<u8>`, so the sample at `(x, y)` lives at
// index `y * width + x`. The grid is immutable once built.

use crate::error::{CompareError, Dimensions};
use image::GrayImage;

/// A single intensity sample (0-255).
pub type Intensity = u8;

/// An immutable, row-major grid of single-channel intensity samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityImage {
    width: u32,
    height: u32,
    samples: Vec<Intensity>,
}

impl IntensityImage {
    /// Wraps a row-major sample buffer. The buffer must hold exactly `width * height` samples.
    pub fn new(width: u32, height: u32, samples: Vec<Intensity>) -> Result<Self, CompareError> {
        if samples.len() != grid_len(width, height) {
            return Err(CompareError::BufferSizeMismatch {
                width,
                height,
                len: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// An image where every sample has the same value.
    pub fn filled(width: u32, height: u32, value: Intensity) -> Self {
        Self {
            width,
            height,
            samples: vec![value; grid_len(width, height)],
        }
    }

    /// Builds an image by evaluating `f(x, y)` for every position in raster order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Intensity) -> Self {
        let mut samples = Vec::with_capacity(grid_len(width, height));
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
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

    /// The sample at `(x, y)`, or `None` when the position is outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<Intensity> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn as_raw(&self) -> &[Intensity] {
        &self.samples
    }
}

impl From<GrayImage> for IntensityImage {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            samples: image.into_raw(),
        }
    }
}

pub(crate) fn grid_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
