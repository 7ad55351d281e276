use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use solver::{Comparison, Coordinate, Solver, SolverConfig};

#[derive(Parser, Debug)]
#[command(
    name = "maze-solve",
    about = "Find a path through a maze image and animate the search",
    version
)]
struct Args {
    /// Maze image, overrides `input` from the config file
    input: Option<PathBuf>,

    /// TOML file with the run configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start pixel as X,Y
    #[arg(long, value_name = "X,Y")]
    start: Option<Coordinate>,

    /// End pixel as X,Y
    #[arg(long, value_name = "X,Y")]
    end: Option<Coordinate>,

    /// Directory for the solution, binarized image and animation
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also save every sampled frame into this directory
    #[arg(long, value_name = "DIR")]
    frames_dir: Option<PathBuf>,

    /// Number of search steps between two frames
    #[arg(long, value_name = "N")]
    sample_interval: Option<usize>,

    /// Channel level a pixel must exceed to count as open
    #[arg(long, value_name = "LEVEL")]
    threshold: Option<u8>,

    /// Let channels equal to the threshold count as open
    #[arg(long)]
    inclusive: bool,

    /// Save the two-color image the search runs on
    #[arg(long)]
    save_binarized: bool,

    /// Do not write the animated GIF
    #[arg(long)]
    no_animation: bool,

    /// Give up the search after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SolverConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if self.frames_dir.is_some() {
            config.frames_dir = self.frames_dir;
        }
        if let Some(sample_interval) = self.sample_interval {
            config.sample_interval = sample_interval;
        }
        if let Some(level) = self.threshold {
            config.threshold.level = level;
        }
        if self.inclusive {
            config.threshold.comparison = Comparison::Inclusive;
        }
        if self.save_binarized {
            config.save_binarized = true;
        }
        if self.no_animation {
            config.animation.enabled = false;
        }
        if self.timeout_ms.is_some() {
            config.max_duration_ms = self.timeout_ms;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Args::parse().into_config()?;
    let solver = Solver::new(config).context("invalid configuration")?;
    let summary = solver.run()?;

    log::debug!("{:?}", summary);

    Ok(if summary.found() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
