//! Movie dataset cleaning and aggregation.
//!
//! A CSV of movie records is loaded, retyped, range-filtered and sealed into
//! an immutable [`types::Dataset`]. Rankings, grouped statistics and rating
//! distributions are computed from it, rendered into a markdown report, and
//! optionally drawn as SVG charts.

pub mod charts;
pub mod config;
pub mod distribution;
pub mod error;
pub mod insights;
pub mod loader;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod util;
pub mod validate;

pub use error::{InsightsError, Result};
