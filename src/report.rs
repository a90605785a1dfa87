//! Report Formatter: aggregation outputs to a markdown document.
//!
//! Nothing here computes statistics. A value that cannot be rendered, such as
//! a non-finite rating, means something upstream is broken and is reported as
//! [`InsightsError::Format`].

use crate::error::{InsightsError, Result};
use crate::types::{ControversyRow, GenreRow, GenreStat, MovieRow, RankedMovie};
use crate::util::{format_int, format_percent};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

/// The three aggregation outputs the report is built from.
#[derive(Debug, Clone, Default)]
pub struct Insights {
    pub top_rated: Vec<RankedMovie>,
    pub controversial: Vec<RankedMovie>,
    pub genre_stats: Vec<GenreStat>,
}

pub fn movie_rows(movies: &[RankedMovie]) -> Result<Vec<MovieRow>> {
    const SECTION: &str = "top rated table";
    movies
        .iter()
        .map(|m| -> Result<MovieRow> {
            let r = &m.movie;
            Ok(MovieRow {
                title: r.title.clone(),
                year: r.release_year,
                critics: percent(SECTION, r.critic_rating)?,
                critics_votes: format_int(r.critic_vote_count),
                audience: percent(SECTION, r.audience_rating)?,
                audience_votes: format_int(r.audience_vote_count),
            })
        })
        .collect()
}

pub fn controversy_rows(movies: &[RankedMovie]) -> Result<Vec<ControversyRow>> {
    const SECTION: &str = "controversy table";
    movies
        .iter()
        .map(|m| -> Result<ControversyRow> {
            let r = &m.movie;
            Ok(ControversyRow {
                title: r.title.clone(),
                year: r.release_year,
                critics: percent(SECTION, r.critic_rating)?,
                critics_votes: format_int(r.critic_vote_count),
                audience: percent(SECTION, r.audience_rating)?,
                audience_votes: format_int(r.audience_vote_count),
                difference: percent(SECTION, r.rating_diff())?,
            })
        })
        .collect()
}

pub fn genre_rows(stats: &[GenreStat]) -> Result<Vec<GenreRow>> {
    const SECTION: &str = "genre table";
    stats
        .iter()
        .map(|s| -> Result<GenreRow> {
            Ok(GenreRow {
                genre: s.genre.clone(),
                rating: percent(SECTION, s.avg_rating)?,
                count: s.movie_count,
                runtime: format!("{} min", fixed(SECTION, s.avg_runtime)?),
            })
        })
        .collect()
}

/// Markdown table with every column after the first right-aligned. An empty
/// slice still renders the header.
pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::markdown())
        .modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

pub fn format_report(insights: &Insights, top_n: usize) -> Result<String> {
    let sections = [
        "# Movie Analysis Insights\n".to_string(),
        format!("\n## Top {top_n} Highest Rated Movies\n\n"),
        render_table(&movie_rows(&insights.top_rated)?),
        "\n\n## Most Controversial Movies\n\n".to_string(),
        render_table(&controversy_rows(&insights.controversial)?),
        "\n\n## Genre Statistics\n\n".to_string(),
        render_table(&genre_rows(&insights.genre_stats)?),
        "\n".to_string(),
    ];
    Ok(sections.concat())
}

fn percent(section: &'static str, value: f64) -> Result<String> {
    check(section, value).map(format_percent)
}

fn fixed(section: &'static str, value: f64) -> Result<String> {
    check(section, value).map(|v| format!("{v:.1}"))
}

fn check(section: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InsightsError::Format {
            section,
            reason: format!("cannot render non-finite value {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovieRecord;

    fn ranked(title: &str, critic: f64, audience: f64) -> RankedMovie {
        RankedMovie {
            movie: MovieRecord {
                title: title.to_string(),
                release_year: 1994,
                critic_rating: critic,
                audience_rating: audience,
                runtime_minutes: 142.0,
                genre: "Drama".to_string(),
                critic_vote_count: 1234,
                audience_vote_count: 2_500_000,
            },
            score: (critic + audience) / 2.0,
        }
    }

    #[test]
    fn test_movie_row_formatting() {
        let rows = movie_rows(&[ranked("Shawshank", 91.0, 98.26)]).unwrap();
        assert_eq!(rows[0].critics, "91.0%");
        assert_eq!(rows[0].audience, "98.3%");
        assert_eq!(rows[0].critics_votes, "1,234");
        assert_eq!(rows[0].audience_votes, "2,500,000");
        assert_eq!(rows[0].year, 1994);
    }

    #[test]
    fn test_controversy_row_difference() {
        let rows = controversy_rows(&[ranked("Split", 20.0, 85.5)]).unwrap();
        assert_eq!(rows[0].difference, "65.5%");
    }

    #[test]
    fn test_genre_row_formatting() {
        let stats = [GenreStat {
            genre: "Drama".to_string(),
            avg_rating: 87.5,
            movie_count: 1200,
            avg_runtime: 100.0,
        }];
        let rows = genre_rows(&stats).unwrap();
        assert_eq!(rows[0].rating, "87.5%");
        assert_eq!(rows[0].runtime, "100.0 min");
        assert_eq!(rows[0].count, 1200);
    }

    #[test]
    fn test_non_finite_is_format_error() {
        let err = movie_rows(&[ranked("Broken", f64::NAN, 50.0)]).unwrap_err();
        assert!(matches!(err, InsightsError::Format { section: "top rated table", .. }));
    }

    #[test]
    fn test_report_has_three_sections_in_order() {
        let insights = Insights {
            top_rated: vec![ranked("Alpha", 90.0, 85.0)],
            controversial: vec![ranked("Beta", 10.0, 90.0)],
            genre_stats: vec![GenreStat {
                genre: "Drama".to_string(),
                avg_rating: 87.5,
                movie_count: 1,
                avg_runtime: 100.0,
            }],
        };
        let doc = format_report(&insights, 20).unwrap();
        assert!(doc.starts_with("# Movie Analysis Insights\n"));
        let top = doc.find("## Top 20 Highest Rated Movies").unwrap();
        let contro = doc.find("## Most Controversial Movies").unwrap();
        let genre = doc.find("## Genre Statistics").unwrap();
        assert!(top < contro && contro < genre);
        assert!(doc.contains("| Title"));
        assert!(doc.contains("Difference"));
        assert!(doc.contains("Alpha"));
        assert!(doc.contains("80.0%"));
        assert!(doc.contains("100.0 min"));
    }

    #[test]
    fn test_empty_sections_render_headers() {
        let doc = format_report(&Insights::default(), 20).unwrap();
        assert!(doc.contains("Audience Votes"));
        assert!(doc.contains("Runtime"));
    }
}
