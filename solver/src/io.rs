//! Reading and writing image files.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use log::info;

use crate::error::SolveError;

/// Open an image file and convert it to 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage, SolveError> {
    let img = image::open(path).map_err(|source| SolveError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let img = img.to_rgb8();
    info!(
        "Image loaded '{}' ({}x{} pixels)",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Write an image, choosing the format from the file extension.
/// Paths without a known extension are written as PNG.
pub fn save_rgb(img: &RgbImage, path: &Path) -> Result<(), SolveError> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);

    img.save_with_format(path, format)
        .map_err(|source| SolveError::Encode {
            path: path.to_path_buf(),
            source,
        })
}
