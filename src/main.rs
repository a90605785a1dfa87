// Entry point and CLI flow.
//
// One batch per invocation: load and clean the CSV, write the insights
// report, render charts unless disabled, then print a short summary and a
// preview of each report table.
use anyhow::{Context, Result};
use clap::Parser;
use movie_insights::config::{AnalysisConfig, ChartConfig, OutputPaths, DEFAULT_RUNTIME_MAX};
use movie_insights::logging::{init_logging, LogConfig};
use movie_insights::output::{preview_table_rows, summary_json};
use movie_insights::pipeline::{run, RunOptions, RunOutcome};
use movie_insights::report::{controversy_rows, genre_rows, movie_rows};
use movie_insights::util::format_int;
use std::path::PathBuf;

const PREVIEW_ROWS: usize = 3;

#[derive(Parser)]
#[command(name = "movie_insights")]
#[command(about = "Clean a movie ratings CSV and report on it", long_about = None)]
struct Cli {
    /// Source CSV
    #[arg(short, long, default_value = "rotten_tomatoes_movies.csv")]
    input: PathBuf,

    /// Directory for the markdown report
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Directory for chart SVGs
    #[arg(short, long, default_value = "output/plots")]
    plots_dir: PathBuf,

    /// Minimum movies for a genre to be reported
    #[arg(long, default_value_t = 10)]
    min_movies: usize,

    /// Minimum critic/audience gap for the controversy table
    #[arg(long, default_value_t = 30.0)]
    controversy_threshold: f64,

    /// Rows in the top-rated and controversy tables
    #[arg(long, default_value_t = 20)]
    top_n: usize,

    /// Upper bound of the valid runtime range, in minutes
    #[arg(long, default_value_t = DEFAULT_RUNTIME_MAX)]
    runtime_max: f64,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json_summary: bool,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_log_file(cli.log_file.clone());
    let _log_guard = init_logging(&log_config).context("failed to open log file")?;

    let config = AnalysisConfig::builder()
        .min_movies_per_genre(cli.min_movies)
        .controversy_threshold(cli.controversy_threshold)
        .top_n(cli.top_n)
        .runtime_max(cli.runtime_max)
        .build()?;
    let paths = OutputPaths::new(&cli.output_dir, &cli.plots_dir);
    let options = RunOptions {
        charts: (!cli.no_charts).then(ChartConfig::default),
    };

    let outcome = run(&cli.input, &config, &paths, &options)
        .with_context(|| format!("analysis of {} failed", cli.input.display()))?;

    if cli.json_summary {
        println!("{}", summary_json(&outcome.summary)?);
    } else {
        print_summary(&outcome, config.top_n)?;
    }
    Ok(())
}

fn print_summary(outcome: &RunOutcome, top_n: usize) -> Result<()> {
    let summary = &outcome.summary;
    println!(
        "Processing dataset... ({} rows loaded, {} kept, {} dropped)\n",
        format_int(summary.rows_loaded),
        format_int(summary.rows_kept),
        format_int(summary.rows_dropped)
    );

    println!("Top {top_n} Highest Rated Movies\n");
    preview_table_rows(&movie_rows(&outcome.insights.top_rated)?, PREVIEW_ROWS);
    println!("Most Controversial Movies\n");
    preview_table_rows(&controversy_rows(&outcome.insights.controversial)?, PREVIEW_ROWS);
    println!("Genre Statistics ({} genres)\n", format_int(summary.genres_reported));
    preview_table_rows(&genre_rows(&outcome.insights.genre_stats)?, PREVIEW_ROWS);

    println!("(Full report exported to {})", summary.report_path);
    if !summary.charts_written.is_empty() {
        println!("Charts saved: {}", summary.charts_written.len());
    }
    for failure in &summary.charts_failed {
        eprintln!("Chart error: {failure}");
    }
    Ok(())
}
