// THEORY:
// The `image_helper` is the boundary between the engine and image files on disk.
// Decoding always collapses the file to 8-bit luma, because the engine compares
// single-channel intensity grids. Encoding writes a `DifferenceRaster` back out as a
// grayscale PNG so the significant differences can be inspected by eye.

pub mod image_helper {
    use crate::core_modules::difference_map::DifferenceRaster;
    use crate::core_modules::intensity_image::IntensityImage;
    use image::{ExtendedColorType, ImageEncoder};
    use std::io::BufWriter;
    use std::path::Path;

    /// Decodes an image file (any format the `image` crate understands) as grayscale.
    pub fn load_grayscale(path: &Path) -> Result<IntensityImage, image::error::ImageError> {
        let decoded = image::open(path)?;
        Ok(IntensityImage::from(decoded.into_luma8()))
    }

    /// Writes a difference raster as an 8-bit grayscale PNG.
    pub fn save_difference(
        path: &Path,
        raster: &DifferenceRaster,
    ) -> Result<(), image::error::ImageError> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::L8,
        )?;

        Ok(())
    }
}
