//! Stage composition.
//!
//! Load → normalize → filter → clean genres yields the [`Dataset`]; the
//! aggregations and the report are computed from it afterwards. Any stage
//! error ends the run before a report is written. Charts come last and fail
//! one at a time.

use crate::charts::{render_all, ChartContext};
use crate::config::{AnalysisConfig, ChartConfig, OutputPaths};
use crate::error::Result;
use crate::insights::{controversial, genre_statistics, top_rated};
use crate::loader::{load_raw, RawTable};
use crate::normalize::normalize;
use crate::output::write_report;
use crate::report::{format_report, Insights};
use crate::types::{Dataset, RunSummary};
use crate::validate::{clean_genres, filter_valid_data};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Retype, filter and seal a raw table.
pub fn process_raw_data(raw: &RawTable, config: &AnalysisConfig) -> Result<Dataset> {
    let normalized = normalize(raw)?;
    info!(stage = "normalize", rows = normalized.len(), "stage complete");

    let filtered = filter_valid_data(normalized, config);
    info!(stage = "filter", rows = filtered.len(), "stage complete");

    let dataset = clean_genres(filtered)?;
    info!(stage = "clean_genres", rows = dataset.len(), "stage complete");

    let dropped = raw.len() - dataset.len();
    if dropped > 0 {
        warn!(dropped, loaded = raw.len(), "records excluded by range checks");
    }
    Ok(dataset)
}

pub fn read_movie_data(path: &Path, config: &AnalysisConfig) -> Result<Dataset> {
    let raw = load_raw(path)?;
    process_raw_data(&raw, config)
}

/// The three report aggregations. All of them succeed or none is returned.
pub fn generate_insights(data: &Dataset, config: &AnalysisConfig) -> Result<Insights> {
    let insights = Insights {
        top_rated: top_rated(data, config.top_n)?,
        controversial: controversial(data, config.controversy_threshold, config.top_n)?,
        genre_stats: genre_statistics(data, config.min_movies_per_genre)?,
    };
    info!(
        top_rated = insights.top_rated.len(),
        controversial = insights.controversial.len(),
        genres = insights.genre_stats.len(),
        "generated insights"
    );
    Ok(insights)
}

/// Format and write the report, returning where it went.
pub fn save_insights(
    insights: &Insights,
    config: &AnalysisConfig,
    paths: &OutputPaths,
) -> Result<PathBuf> {
    let document = format_report(insights, config.top_n)?;
    let path = paths.report_path();
    write_report(&path, &document)?;
    Ok(path)
}

/// Options for [`run`] that are not analysis parameters.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub charts: Option<ChartConfig>,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub dataset: Dataset,
    pub insights: Insights,
    pub summary: RunSummary,
}

/// Full batch: data, report, then charts when enabled.
pub fn run(
    input: &Path,
    config: &AnalysisConfig,
    paths: &OutputPaths,
    options: &RunOptions,
) -> Result<RunOutcome> {
    let span = info_span!("run", input = %input.display());
    let _enter = span.enter();

    paths.prepare(options.charts.is_some())?;
    let raw = load_raw(input)?;
    let dataset = process_raw_data(&raw, config)?;
    let insights = generate_insights(&dataset, config)?;
    let report_path = save_insights(&insights, config, paths)?;

    let mut summary = RunSummary {
        rows_loaded: raw.len(),
        rows_kept: dataset.len(),
        rows_dropped: raw.len() - dataset.len(),
        genres_reported: insights.genre_stats.len(),
        top_rated: insights.top_rated.len(),
        controversial: insights.controversial.len(),
        report_path: report_path.display().to_string(),
        ..Default::default()
    };

    if let Some(chart) = &options.charts {
        let ctx = ChartContext {
            data: &dataset,
            analysis: config,
            chart,
        };
        let outcome = render_all(&ctx, &paths.plots_dir);
        summary.charts_written = outcome.written.iter().map(|p| p.display().to_string()).collect();
        summary.charts_failed = outcome.failed.iter().map(ToString::to_string).collect();
    }

    info!(kept = summary.rows_kept, report = %summary.report_path, "analysis complete");
    Ok(RunOutcome {
        dataset,
        insights,
        summary,
    })
}
