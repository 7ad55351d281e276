//! Solves mazes drawn in raster images.
//!
//! The image is reduced to a grid of passable and blocked cells
//! ([`binarize()`]), searched breadth first ([`search()`]) while the exploration
//! is sampled into frames, and the outcome is drawn back onto the original
//! image ([`render()`]). The frames can be assembled into a GIF
//! ([`sequence`]).

pub mod binarize;
pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod io;
pub mod render;
pub mod search;
pub mod sequence;

use std::path::PathBuf;

use image::RgbImage;
use log::{error, info, warn};

pub use crate::binarize::{binarize, Comparison, Threshold};
pub use crate::config::{ConfigError, Coordinate, SolverConfig};
pub use crate::error::SolveError;
pub use crate::find::{MapStorage, MapTrait, PathFinder, PathFinderState, PathResult, Visited};
pub use crate::grid::{Cell, CellStorage, GridMap, Point};
pub use crate::render::{render, Color, Palette};
pub use crate::search::{search, SearchOptions, SearchReport, Snapshot};

/// Everything a solved maze produced, before anything is written to disk.
#[derive(Debug)]
pub struct Solution {
    pub grid: GridMap,
    pub report: SearchReport,
    pub rendered: RgbImage,
}

/// What a [`Solver::run`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Length of the path in moves, if one was found
    pub hops: Option<usize>,
    pub timed_out: bool,
    pub frames: usize,
    /// Files written, in order
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn found(&self) -> bool {
        self.hops.is_some()
    }
}

/// Runs the whole pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Binarize, search and render an image that is already in memory.
    pub fn solve_image(&self, original: &RgbImage) -> Result<Solution, SolveError> {
        let config = &self.config;
        let start = Point::from(config.start);
        let end = Point::from(config.end);

        let grid = binarize(original, &config.threshold);

        info!("Solving from {} to {}...", start, end);
        let report = search(&grid, start, end, &config.search_options()?)?;

        match &report.state {
            PathFinderState::PathFound(result) => {
                info!("Path found: {} moves", result.hops)
            }
            PathFinderState::TimedOut => warn!(
                "Search gave up after {} ms",
                config.max_duration_ms.unwrap_or_default()
            ),
            _ => error!("No path found"),
        }

        let rendered = render(original, report.path(), start, end, &config.colors);

        Ok(Solution {
            grid,
            report,
            rendered,
        })
    }

    /// Load the input, solve it and write every configured output.
    pub fn run(&self) -> Result<RunSummary, SolveError> {
        let config = &self.config;
        let original = io::load_rgb(&config.input)?;
        let solution = self.solve_image(&original)?;

        std::fs::create_dir_all(&config.output_dir)?;
        let mut written = Vec::new();

        if config.save_binarized {
            let path = config.binarized_path();
            let pure = solution
                .grid
                .to_image(config.colors.passable.into(), config.colors.blocked.into());
            io::save_rgb(&pure, &path)?;
            info!("Binarized image saved '{}'", path.display());
            written.push(path);
        }

        let path = config.solution_path();
        io::save_rgb(&solution.rendered, &path)?;
        info!("Solution saved as '{}'", path.display());
        written.push(path);

        let snapshots = &solution.report.snapshots;

        if let Some(dir) = &config.frames_dir {
            sequence::write_frames(snapshots, dir)?;
            written.push(dir.clone());
        }

        if config.animation.enabled {
            let path = config.animation_path();
            if sequence::write_gif(snapshots, &path, &config.animation)? > 0 {
                written.push(path);
            }
        }

        Ok(RunSummary {
            hops: solution.report.path().map(|p| p.len() - 1),
            timed_out: solution.report.state == PathFinderState::TimedOut,
            frames: snapshots.len(),
            written,
        })
    }
}
