use movie_insights::config::{AnalysisConfig, ChartConfig, OutputPaths, REPORT_FILE_NAME};
use movie_insights::insights::{controversial, genre_statistics, top_rated};
use movie_insights::pipeline::{read_movie_data, run, RunOptions};
use movie_insights::InsightsError;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str = "movie_title,in_theaters_date,tomatometer_rating,audience_rating,runtime_in_minutes,genre,tomatometer_count,audience_count";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn three_rows() -> NamedTempFile {
    write_csv(&[
        "A,2000-06-01,90,85,100,Drama,120,5000",
        "B,2020-01-10,NaN,50,90,,3,40",
        "C,1800-01-01,50,50,100,Drama,7,80",
    ])
}

#[test]
fn test_end_to_end_three_rows() {
    let csv = three_rows();
    let config = AnalysisConfig::builder().min_movies_per_genre(1).build().unwrap();
    let data = read_movie_data(csv.path(), &config).unwrap();

    let titles: Vec<&str> = data.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["A"]);

    let stats = genre_statistics(&data, 1).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].genre, "Drama");
    // Genre statistics average the critic rating only.
    assert_eq!(stats[0].avg_rating, 90.0);
    assert_eq!(stats[0].movie_count, 1);
    assert_eq!(stats[0].avg_runtime, 100.0);
}

#[test]
fn test_top_rated_is_stable_over_twenty() {
    let mut rows = Vec::new();
    for i in 0..25 {
        rows.push(format!("M{i:02},2001,{},{},100,Drama,1,1", 50 + i, 50 + i));
    }
    // Same average as M24 (74), appearing later in the source.
    rows.push("Tie,2001,80,68,100,Drama,1,1".to_string());
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let csv = write_csv(&refs);

    let data = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    let top = top_rated(&data, 20).unwrap();
    assert_eq!(top.len(), 20);
    assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(top[0].movie.title, "M24");
    assert_eq!(top[1].movie.title, "Tie");
}

#[test]
fn test_controversy_threshold_is_inclusive() {
    let csv = write_csv(&[
        "Exact,2001,80,50,100,Drama,1,1",
        "Below,2001,79.9,50,100,Drama,1,1",
        "Wide,2001,10,95,100,Drama,1,1",
    ]);
    let data = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    let picked = controversial(&data, 30.0, 20).unwrap();
    let titles: Vec<&str> = picked.iter().map(|m| m.movie.title.as_str()).collect();
    assert_eq!(titles, vec!["Wide", "Exact"]);
}

#[test]
fn test_runtime_bound_is_configurable() {
    let csv = write_csv(&["Long,2001,80,80,290,Epic,1,1", "Short,2001,80,80,90,Epic,1,1"]);
    let canonical = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(canonical.len(), 1);

    let legacy = AnalysisConfig::builder().runtime_max(300.0).build().unwrap();
    assert_eq!(read_movie_data(csv.path(), &legacy).unwrap().len(), 2);
}

#[test]
fn test_missing_column_is_normalization_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "movie_title,in_theaters_date,audience_rating,runtime_in_minutes,genre,tomatometer_count,audience_count"
    )
    .unwrap();
    writeln!(file, "A,2000,85,100,Drama,1,1").unwrap();
    file.flush().unwrap();

    let err = read_movie_data(file.path(), &AnalysisConfig::default()).unwrap_err();
    match err {
        InsightsError::Normalization { column } => assert_eq!(column, "tomatometer_rating"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_short_row_is_kept_then_filtered() {
    let csv = write_csv(&["A,2000,90,85,100,Drama,1,1", "B,2001-01-01,70,60,100"]);
    let data = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    let titles: Vec<&str> = data.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["A"]);
}

#[test]
fn test_short_row_with_complete_ratings_survives() {
    // Genre and vote counts are cut off; they read as MISSING and default.
    let csv = write_csv(&["A,2000,90,85,100"]);
    let data = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.records()[0].genre, "Unknown");
    assert_eq!(data.records()[0].audience_vote_count, 0);
}

#[test]
fn test_long_row_is_load_error() {
    let csv = write_csv(&["A,2000,90,85,100,Drama,1,1", "B,2000,90,85,100,Drama,1,1,extra"]);
    let err = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, InsightsError::Load { .. }));
}

#[test]
fn test_na_genre_spellings_default_to_unknown() {
    let csv = write_csv(&[
        "A,2000,90,85,100,NaN,1,1",
        "B,2000,80,75,100,N/A,1,1",
        "C,2000,70,65,100,NULL,1,1",
    ]);
    let data = read_movie_data(csv.path(), &AnalysisConfig::default()).unwrap();
    let genres: Vec<&str> = data.iter().map(|m| m.genre.as_str()).collect();
    assert_eq!(genres, vec!["Unknown", "Unknown", "Unknown"]);
}

#[test]
fn test_unreadable_source_is_load_error() {
    let err = read_movie_data(Path::new("/definitely/not/here.csv"), &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, InsightsError::LoadIo { .. }));
}

#[test]
fn test_run_writes_and_overwrites_report() {
    let csv = three_rows();
    let out = tempdir().unwrap();
    let paths = OutputPaths::new(out.path().join("out"), out.path().join("plots"));
    let config = AnalysisConfig::builder().min_movies_per_genre(1).build().unwrap();
    std::fs::create_dir_all(&paths.output_dir).unwrap();
    std::fs::write(paths.output_dir.join(REPORT_FILE_NAME), "stale").unwrap();

    let outcome = run(csv.path(), &config, &paths, &RunOptions::default()).unwrap();
    assert_eq!(outcome.summary.rows_loaded, 3);
    assert_eq!(outcome.summary.rows_kept, 1);
    assert_eq!(outcome.summary.rows_dropped, 2);
    assert!(outcome.summary.charts_written.is_empty());
    // Charts are disabled, so no plot directory is created.
    assert!(!paths.plots_dir.exists());

    let report = std::fs::read_to_string(paths.report_path()).unwrap();
    assert!(!report.contains("stale"));
    assert!(report.starts_with("# Movie Analysis Insights"));
    assert!(report.contains("## Top 20 Highest Rated Movies"));
    assert!(report.contains("90.0%"));
    assert!(report.contains("85.0%"));
    assert!(report.contains("5,000"));
}

#[test]
fn test_failed_run_writes_no_report() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "movie_title,genre").unwrap();
    writeln!(file, "A,Drama").unwrap();
    file.flush().unwrap();

    let out = tempdir().unwrap();
    let paths = OutputPaths::new(out.path(), out.path().join("plots"));
    assert!(run(file.path(), &AnalysisConfig::default(), &paths, &RunOptions::default()).is_err());
    assert!(!paths.report_path().exists());
}

#[test]
fn test_chart_failures_do_not_fail_the_run() {
    // One movie: too few per genre and per year for the grouped charts.
    let csv = three_rows();
    let out = tempdir().unwrap();
    let paths = OutputPaths::new(out.path(), out.path().join("plots"));
    let options = RunOptions {
        charts: Some(ChartConfig::default()),
    };

    let outcome = run(csv.path(), &AnalysisConfig::default(), &paths, &options).unwrap();
    assert_eq!(outcome.summary.charts_written.len(), 2);
    assert_eq!(outcome.summary.charts_failed.len(), 2);
    assert!(paths.plots_dir.is_dir());
    assert!(paths.report_path().is_file());
}
