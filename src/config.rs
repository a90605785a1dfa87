//! Run configuration.
//!
//! `AnalysisConfig` is fully constructed by its builder before any stage sees
//! it and is never patched afterwards.

use crate::error::{InsightsError, Result};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Canonical upper bound for `runtime_minutes`. An older variant of the
/// pipeline used [`LEGACY_RUNTIME_MAX`] instead.
pub const DEFAULT_RUNTIME_MAX: f64 = 280.0;
pub const LEGACY_RUNTIME_MAX: f64 = 300.0;

pub const DEFAULT_MIN_MOVIES_PER_GENRE: usize = 10;
pub const DEFAULT_MIN_MOVIES_PER_YEAR: usize = 5;
pub const DEFAULT_CONTROVERSY_THRESHOLD: f64 = 30.0;
pub const DEFAULT_TOP_N: usize = 20;
pub const DEFAULT_GENRE_COMPARISON_LIMIT: usize = 10;

pub const REPORT_FILE_NAME: &str = "movie_insights.md";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub year_range: RangeInclusive<i32>,
    pub rating_range: RangeInclusive<f64>,
    pub runtime_range: RangeInclusive<f64>,
    pub min_movies_per_genre: usize,
    pub min_movies_per_year: usize,
    pub controversy_threshold: f64,
    pub top_n: usize,
    pub genre_comparison_limit: usize,
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_range: 1900..=2024,
            rating_range: 0.0..=100.0,
            runtime_range: 0.0..=DEFAULT_RUNTIME_MAX,
            min_movies_per_genre: DEFAULT_MIN_MOVIES_PER_GENRE,
            min_movies_per_year: DEFAULT_MIN_MOVIES_PER_YEAR,
            controversy_threshold: DEFAULT_CONTROVERSY_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            genre_comparison_limit: DEFAULT_GENRE_COMPARISON_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    runtime_max: Option<f64>,
    min_movies_per_genre: Option<usize>,
    min_movies_per_year: Option<usize>,
    controversy_threshold: Option<f64>,
    top_n: Option<usize>,
    genre_comparison_limit: Option<usize>,
}

impl AnalysisConfigBuilder {
    #[must_use]
    pub fn runtime_max(mut self, minutes: f64) -> Self {
        self.runtime_max = Some(minutes);
        self
    }

    #[must_use]
    pub fn min_movies_per_genre(mut self, count: usize) -> Self {
        self.min_movies_per_genre = Some(count);
        self
    }

    #[must_use]
    pub fn min_movies_per_year(mut self, count: usize) -> Self {
        self.min_movies_per_year = Some(count);
        self
    }

    #[must_use]
    pub fn controversy_threshold(mut self, threshold: f64) -> Self {
        self.controversy_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    #[must_use]
    pub fn genre_comparison_limit(mut self, n: usize) -> Self {
        self.genre_comparison_limit = Some(n);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let runtime_max = self.runtime_max.unwrap_or(DEFAULT_RUNTIME_MAX);
        if !runtime_max.is_finite() || runtime_max < 0.0 {
            return Err(InsightsError::Config(format!(
                "runtime upper bound must be a non-negative number, got {runtime_max}"
            )));
        }

        let controversy_threshold = self
            .controversy_threshold
            .unwrap_or(defaults.controversy_threshold);
        if !controversy_threshold.is_finite() || controversy_threshold < 0.0 {
            return Err(InsightsError::Config(format!(
                "controversy threshold must be a non-negative number, got {controversy_threshold}"
            )));
        }

        let top_n = self.top_n.unwrap_or(defaults.top_n);
        if top_n == 0 {
            return Err(InsightsError::Config("top-N must be at least 1".into()));
        }

        Ok(AnalysisConfig {
            runtime_range: 0.0..=runtime_max,
            min_movies_per_genre: self
                .min_movies_per_genre
                .unwrap_or(defaults.min_movies_per_genre),
            min_movies_per_year: self
                .min_movies_per_year
                .unwrap_or(defaults.min_movies_per_year),
            controversy_threshold,
            top_n,
            genre_comparison_limit: self
                .genre_comparison_limit
                .unwrap_or(defaults.genre_comparison_limit),
            ..defaults
        })
    }
}

/// Settings handed to the chart collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            font_size: 10,
            title_size: 14,
            label_size: 12,
            tick_size: 10,
        }
    }
}

/// Where a run writes its artifacts.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub output_dir: PathBuf,
    pub plots_dir: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: impl Into<PathBuf>, plots_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            plots_dir: plots_dir.into(),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Create the output directory, and the plot directory when charts will
    /// be drawn, if they are missing.
    pub fn prepare(&self, with_charts: bool) -> Result<()> {
        create_dir(&self.output_dir)?;
        if with_charts {
            create_dir(&self.plots_dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| InsightsError::Write {
        path: dir.to_path_buf(),
        source,
    })
}
