//! Run configuration.
//!
//! Every field has a default, so a config file is optional and only needs to
//! name what differs. The binary layers command line flags on top.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    binarize::Threshold,
    grid::Point,
    render::Palette,
    search::{SearchOptions, DEFAULT_SAMPLE_INTERVAL},
    sequence::AnimationOptions,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// A pixel position, `x` to the right and `y` down from the top left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::from_xy(c.x, c.y)
    }
}

/// Parses `X,Y`.
impl FromStr for Coordinate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::ValidationError(format!("invalid coordinate: {}", s));

        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Coordinate {
            x: x.trim().parse().map_err(|_| invalid())?,
            y: y.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SolverConfig {
    /// The maze image
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// When set, every snapshot is also saved here as a separate image
    pub frames_dir: Option<PathBuf>,
    pub start: Coordinate,
    pub end: Coordinate,
    pub threshold: Threshold,
    /// Enumerated neighbors between two snapshots
    pub sample_interval: usize,
    /// Also write the two-color image the search runs on
    pub save_binarized: bool,
    pub max_duration_ms: Option<u64>,
    pub colors: Palette,
    pub animation: AnimationOptions,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from("Results"),
            frames_dir: None,
            start: Coordinate::default(),
            end: Coordinate::default(),
            threshold: Threshold::default(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            save_binarized: false,
            max_duration_ms: None,
            colors: Palette::default(),
            animation: AnimationOptions::default(),
        }
    }
}

impl SolverConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: SolverConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "no input image given".to_string(),
            ));
        }
        if self.sample_interval == 0 {
            return Err(ConfigError::ValidationError(
                "sample_interval must be at least 1".to_string(),
            ));
        }
        if self.animation.downscale == 0 {
            return Err(ConfigError::ValidationError(
                "animation.downscale must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_options(&self) -> Result<SearchOptions, ConfigError> {
        let sample_interval = NonZeroUsize::new(self.sample_interval).ok_or_else(|| {
            ConfigError::ValidationError("sample_interval must be at least 1".to_string())
        })?;

        Ok(SearchOptions {
            sample_interval,
            max_duration: self.max_duration_ms.map(Duration::from_millis),
            palette: self.colors,
        })
    }

    fn stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "maze".to_string())
    }

    fn extension(&self) -> String {
        self.input
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string())
    }

    /// `<output_dir>/<stem>.<ext>`
    pub fn solution_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.stem(), self.extension()))
    }

    /// `<output_dir>/<stem>_pure.<ext>`
    pub fn binarized_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_pure.{}", self.stem(), self.extension()))
    }

    /// `<output_dir>/<stem>.gif`
    pub fn animation_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.gif", self.stem()))
    }
}
