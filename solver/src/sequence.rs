//! Turns the recorded snapshots into an animation.

use std::{
    fs::File,
    io::BufWriter,
    path::Path,
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
    Delay, DynamicImage, Frame, ImageError, RgbImage,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{error::SolveError, io::save_rgb, search::Snapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnimationOptions {
    pub enabled: bool,
    /// Frames are shrunk by this factor before encoding
    pub downscale: u32,
    pub frame_delay_ms: u32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            downscale: 4,
            frame_delay_ms: 100,
        }
    }
}

/// Shrink a frame by an integer factor, never below one pixel.
pub fn downscale(frame: &RgbImage, factor: u32) -> RgbImage {
    if factor <= 1 {
        return frame.clone();
    }

    let width = (frame.width() / factor).max(1);
    let height = (frame.height() / factor).max(1);
    imageops::resize(frame, width, height, FilterType::Lanczos3)
}

/// Encode the snapshots, in the order given, as a looping GIF.
///
/// Returns the number of frames written. Nothing is written when there are no
/// snapshots.
pub fn write_gif(
    snapshots: &[Snapshot],
    path: &Path,
    options: &AnimationOptions,
) -> Result<usize, SolveError> {
    if snapshots.is_empty() {
        warn!("No snapshots recorded, skipping '{}'", path.display());
        return Ok(0);
    }

    let encode_error = |source: ImageError| SolveError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| encode_error(ImageError::IoError(e)))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;

    let delay = Delay::from_numer_denom_ms(options.frame_delay_ms, 1);
    for snapshot in snapshots {
        let small = downscale(&snapshot.frame, options.downscale);
        let rgba = DynamicImage::ImageRgb8(small).into_rgba8();
        encoder
            .encode_frame(Frame::from_parts(rgba, 0, 0, delay))
            .map_err(encode_error)?;
    }

    info!(
        "Animation written '{}' ({} frames)",
        path.display(),
        snapshots.len()
    );
    Ok(snapshots.len())
}

/// Save every snapshot as `<index>.png` inside `dir`, creating it if needed.
pub fn write_frames(snapshots: &[Snapshot], dir: &Path) -> Result<(), SolveError> {
    std::fs::create_dir_all(dir)?;

    for snapshot in snapshots {
        save_rgb(
            &snapshot.frame,
            &dir.join(format!("{}.png", snapshot.index)),
        )?;
    }

    info!("{} frames saved in '{}'", snapshots.len(), dir.display());
    Ok(())
}
