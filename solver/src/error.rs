//! Errors surfaced by the solver.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::grid::Point;

/// Errors that can occur while solving a maze.
///
/// Not finding a path is not an error, see [`crate::PathFinderState`].
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The input image could not be read or decoded.
    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An output image or animation could not be written.
    #[error("failed to encode image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A search endpoint lies outside the maze.
    #[error("point {point} lies outside the {width}x{height} maze")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output directories could not be created.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}
