//! The search entry point: runs the [`PathFinder`] over a [`GridMap`] while a
//! [`Recorder`] paints the frontier and samples frames for the animation.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use image::{Rgb, RgbImage};
use log::debug;

use crate::{
    error::SolveError,
    find::{MapTrait, PathFinder, PathFinderState, Tracer, Visited},
    grid::{CellStorage, GridMap, Point},
    render::Palette,
};

/// Default number of enumerated neighbors between two frames.
pub const DEFAULT_SAMPLE_INTERVAL: usize = 10_000;

/// A frame of the exploration, as it looked after step `index * interval`.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub index: usize,
    pub frame: RgbImage,
}

#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub sample_interval: NonZeroUsize,
    /// Stop with [`PathFinderState::TimedOut`] once this much time has passed
    pub max_duration: Option<Duration>,
    pub palette: Palette,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sample_interval: NonZeroUsize::new(DEFAULT_SAMPLE_INTERVAL)
                .unwrap_or(NonZeroUsize::MIN),
            max_duration: None,
            palette: Palette::default(),
        }
    }
}

/// Paints every enqueued cell onto a working copy of the maze and captures it
/// every `interval` steps.
#[derive(Debug)]
pub struct Recorder {
    canvas: RgbImage,
    paint: Rgb<u8>,
    interval: NonZeroUsize,
    snapshots: Vec<Snapshot>,
}

impl Recorder {
    pub fn new(canvas: RgbImage, paint: Rgb<u8>, interval: NonZeroUsize) -> Self {
        Self {
            canvas,
            paint,
            interval,
            snapshots: Vec::new(),
        }
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl Tracer<Point> for Recorder {
    fn on_enqueue(&mut self, node: Point) {
        self.canvas
            .put_pixel(node.col as u32, node.row as u32, self.paint);
    }

    fn on_candidate(&mut self, step: usize) {
        if step % self.interval.get() == 0 {
            self.snapshots.push(Snapshot {
                index: self.snapshots.len(),
                frame: self.canvas.clone(),
            });
        }
    }
}

#[derive(Debug)]
pub struct SearchReport {
    pub state: PathFinderState<Point>,
    pub snapshots: Vec<Snapshot>,
    pub visited: CellStorage<Visited<Point>>,
    /// Nodes dequeued
    pub expansions: usize,
    /// Neighbors enumerated
    pub steps: usize,
}

impl SearchReport {
    pub fn path(&self) -> Option<&[Point]> {
        self.state.path()
    }

    /// The path, if any, and the recorded frames
    pub fn into_parts(self) -> (Option<Vec<Point>>, Vec<Snapshot>) {
        let path = match self.state {
            PathFinderState::PathFound(result) => Some(result.path),
            _ => None,
        };
        (path, self.snapshots)
    }
}

fn check_bounds(grid: &GridMap, point: Point) -> Result<(), SolveError> {
    if grid.is_valid(point) {
        Ok(())
    } else {
        Err(SolveError::OutOfBounds {
            point,
            width: grid.width(),
            height: grid.height(),
        })
    }
}

/// Breadth-first search from `start` to `end`, recording the exploration.
///
/// The frames start from the two-color rendering of `grid`.
pub fn search(
    grid: &GridMap,
    start: Point,
    end: Point,
    options: &SearchOptions,
) -> Result<SearchReport, SolveError> {
    check_bounds(grid, start)?;
    check_bounds(grid, end)?;

    let palette = &options.palette;
    let canvas = grid.to_image(palette.passable.into(), palette.blocked.into());
    let mut recorder = Recorder::new(canvas, palette.paint.into(), options.sample_interval);

    let visited: CellStorage<Visited<Point>> = grid.create_storage();
    let mut finder = PathFinder::new(start, end, visited);
    if let Some(max_duration) = options.max_duration {
        finder = finder.with_deadline(Instant::now() + max_duration);
    }

    let began = Instant::now();
    let state = finder.finish(grid, &mut recorder);

    debug!(
        "search from {} to {} done in {:?}: {} expansions, {} steps, {} frames",
        start,
        end,
        began.elapsed(),
        finder.expansions(),
        finder.steps(),
        recorder.snapshots.len()
    );

    Ok(SearchReport {
        state,
        expansions: finder.expansions(),
        steps: finder.steps(),
        visited: finder.into_visited(),
        snapshots: recorder.into_snapshots(),
    })
}
