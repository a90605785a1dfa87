//! Distribution Binner.
//!
//! Buckets paired ratings into a fixed 10×10 grid, and runtimes against
//! critic ratings into a coarser histogram with per-range rating summaries.

use crate::types::{Dataset, MovieRecord};
use crate::util::quantile;
use tracing::debug;

pub const GRID_SIZE: usize = 10;
const BIN_WIDTH: f64 = 10.0;

/// Counts indexed by `[row][column]`, where the column is the critic-rating
/// decile and the row is `9 - audience decile`, so the highest audience
/// band is row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionGrid {
    cells: [[u64; GRID_SIZE]; GRID_SIZE],
}

impl DistributionGrid {
    pub fn get(&self, row: usize, column: usize) -> u64 {
        self.cells[row][column]
    }

    pub fn rows(&self) -> &[[u64; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    pub fn max(&self) -> u64 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    fn add(&mut self, critic: f64, audience: f64) {
        let column = decile(critic);
        let row = GRID_SIZE - 1 - decile(audience);
        self.cells[row][column] += 1;
    }
}

/// Bucket of a rating in [0, 100]; 100 falls into the last bucket.
pub fn decile(rating: f64) -> usize {
    ((rating / BIN_WIDTH).floor().max(0.0) as usize).min(GRID_SIZE - 1)
}

/// Grid over the valid-ratings restriction of `data`.
pub fn rating_distribution(data: &Dataset) -> DistributionGrid {
    let grid = bin_ratings(data.valid_ratings());
    debug!(total = grid.total(), "binned rating distribution");
    grid
}

/// Grid over `records`. Callers are expected to pass rows with valid ratings.
pub fn bin_ratings<'a>(records: impl IntoIterator<Item = &'a MovieRecord>) -> DistributionGrid {
    records.into_iter().fold(DistributionGrid::default(), |mut grid, r| {
        grid.add(r.critic_rating, r.audience_rating);
        grid
    })
}

/// Runtime bin edges in minutes: seven equal bins over [30, 240].
pub const RUNTIME_EDGES: [f64; 8] = [30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0];
const RATING_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(Self {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

/// Ratings of movies whose runtime falls in `(lower, upper]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeRange {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub critic: Option<FiveNumberSummary>,
    pub audience: Option<FiveNumberSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeDistribution {
    pub runtime_edges: Vec<f64>,
    pub rating_edges: Vec<f64>,
    /// `counts[runtime_bin][rating_bin]`.
    pub counts: Vec<Vec<u64>>,
    pub ranges: Vec<RuntimeRange>,
}

impl RuntimeDistribution {
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Histogram bin of `value` over `bins` equal bins spanning `[lo, hi]`.
/// Values outside the edges have no bin; `hi` itself lands in the last bin.
pub fn histogram_bin(value: f64, lo: f64, hi: f64, bins: usize) -> Option<usize> {
    if !(lo..=hi).contains(&value) || bins == 0 {
        return None;
    }
    let width = (hi - lo) / bins as f64;
    Some((((value - lo) / width).floor() as usize).min(bins - 1))
}

/// Runtime × critic-rating histogram over movies with runtime in
/// `[0, runtime_max]`, plus rating summaries per runtime range.
pub fn runtime_distribution(data: &Dataset, runtime_max: f64) -> RuntimeDistribution {
    let rows = data.valid_runtime(runtime_max);
    let runtime_bins = RUNTIME_EDGES.len() - 1;
    let (rt_lo, rt_hi) = (RUNTIME_EDGES[0], RUNTIME_EDGES[runtime_bins]);

    let mut counts = vec![vec![0u64; RATING_BINS]; runtime_bins];
    for r in &rows {
        let runtime_bin = histogram_bin(r.runtime_minutes, rt_lo, rt_hi, runtime_bins);
        let rating_bin = histogram_bin(r.critic_rating, 0.0, 100.0, RATING_BINS);
        if let (Some(x), Some(y)) = (runtime_bin, rating_bin) {
            counts[x][y] += 1;
        }
    }

    let ranges = RUNTIME_EDGES
        .windows(2)
        .map(|w| {
            let (lower, upper) = (w[0], w[1]);
            let members: Vec<&&MovieRecord> = rows
                .iter()
                .filter(|r| r.runtime_minutes > lower && r.runtime_minutes <= upper)
                .collect();
            RuntimeRange {
                lower,
                upper,
                count: members.len(),
                critic: FiveNumberSummary::from_values(
                    members.iter().map(|r| r.critic_rating).collect(),
                ),
                audience: FiveNumberSummary::from_values(
                    members.iter().map(|r| r.audience_rating).collect(),
                ),
            }
        })
        .collect();

    let rating_edges = (0..=RATING_BINS).map(|i| i as f64 * 100.0 / RATING_BINS as f64).collect();
    let dist = RuntimeDistribution {
        runtime_edges: RUNTIME_EDGES.to_vec(),
        rating_edges,
        counts,
        ranges,
    };
    debug!(total = dist.total(), "binned runtime distribution");
    dist
}
