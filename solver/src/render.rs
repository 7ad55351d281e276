//! Draws the outcome of a search on top of the original maze image.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::grid::Point;

/// Half-length of the cross-hair drawn on the endpoints when no path exists.
pub const CROSSHAIR_ARM: i64 = 10;

/// An RGB color, written as `[r, g, b]` in configuration files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const RED: Color = Color([255, 0, 0]);
    pub const GREEN: Color = Color([0, 255, 0]);
    pub const BLUE: Color = Color([0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0]);
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Palette {
    /// Cells waiting in the frontier, in the exploration frames
    pub paint: Color,
    pub solution: Color,
    pub start_marker: Color,
    pub end_marker: Color,
    pub passable: Color,
    pub blocked: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            paint: Color::BLUE,
            solution: Color::RED,
            start_marker: Color::GREEN,
            end_marker: Color::RED,
            passable: Color::WHITE,
            blocked: Color::BLACK,
        }
    }
}

/// Render the result of a search.
///
/// With a path, every cell on it is colored with `palette.solution`. Without
/// one, cross-hairs mark `start` and `end` instead. The original image is
/// left untouched.
pub fn render(
    original: &RgbImage,
    path: Option<&[Point]>,
    start: Point,
    end: Point,
    palette: &Palette,
) -> RgbImage {
    let mut img = original.clone();

    match path {
        Some(path) => {
            let color = palette.solution.into();
            for point in path {
                put_pixel_checked(&mut img, point.col as i64, point.row as i64, color);
            }
        }
        None => {
            draw_crosshair(&mut img, start, palette.start_marker.into());
            draw_crosshair(&mut img, end, palette.end_marker.into());
        }
    }

    img
}

fn draw_crosshair(img: &mut RgbImage, center: Point, color: Rgb<u8>) {
    let (x, y) = (center.col as i64, center.row as i64);

    for d in -CROSSHAIR_ARM..=CROSSHAIR_ARM {
        put_pixel_checked(img, x + d, y, color);
        put_pixel_checked(img, x, y + d, color);
    }
}

/// Pixels outside the image are skipped
fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}
