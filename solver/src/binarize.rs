use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, GridMap, Point};

/// How a channel value is compared against the threshold level
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// `value > level`
    #[default]
    Strict,
    /// `value >= level`
    Inclusive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Threshold {
    pub level: u8,
    pub comparison: Comparison,
}

impl Default for Threshold {
    fn default() -> Self {
        // channels go from 0 to 255, 128 is the middle
        Self {
            level: 128,
            comparison: Comparison::Strict,
        }
    }
}

impl Threshold {
    pub fn passes(&self, value: u8) -> bool {
        match self.comparison {
            Comparison::Strict => value > self.level,
            Comparison::Inclusive => value >= self.level,
        }
    }
}

/// Convert an image into a grid of passable and blocked cells.
///
/// A pixel is passable only when all three channels pass the threshold.
pub fn binarize(img: &RgbImage, threshold: &Threshold) -> GridMap {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut map = GridMap::new(height, width);

    for (x, y, pixel) in img.enumerate_pixels() {
        let cell = if pixel.0.iter().all(|c| threshold.passes(*c)) {
            Cell::Passable
        } else {
            Cell::Blocked
        };
        map.set(Point::from_xy(x as usize, y as usize), cell);
    }

    map
}
