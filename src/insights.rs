//! Aggregation Engine.
//!
//! Every operation is a pure function of a [`Dataset`] and either returns its
//! whole result or an [`InsightsError::Aggregation`]; nothing partial.

use crate::error::{InsightsError, Result};
use crate::types::{
    Dataset, GenreComparison, GenreStat, MovieRecord, RankedMovie, RatingSummary, YearStat,
};
use crate::util::{average, sample_std_dev};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Per-genre mean critic rating, mean runtime and count, for genres with at
/// least `min_movies` records. Genres come back in name order.
pub fn genre_statistics(data: &Dataset, min_movies: usize) -> Result<Vec<GenreStat>> {
    const OP: &str = "genre statistics";
    #[derive(Default)]
    struct Acc {
        ratings: Vec<f64>,
        runtimes: Vec<f64>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.genre.as_str()).or_default();
        e.ratings.push(r.critic_rating);
        e.runtimes.push(r.runtime_minutes);
    }

    let stats = map
        .into_iter()
        .filter(|(_, acc)| acc.ratings.len() >= min_movies)
        .map(|(genre, acc)| -> Result<GenreStat> {
            Ok(GenreStat {
                genre: genre.to_string(),
                avg_rating: finite(OP, genre, average(&acc.ratings))?,
                movie_count: acc.ratings.len(),
                avg_runtime: finite(OP, genre, average(&acc.runtimes))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(genres = stats.len(), min_movies, "computed genre statistics");
    Ok(stats)
}

/// The `n` movies with the highest mean of critic and audience rating.
pub fn top_rated(data: &Dataset, n: usize) -> Result<Vec<RankedMovie>> {
    let scored = data
        .valid_ratings()
        .into_iter()
        .map(|r| (r.avg_rating(), r))
        .collect();
    let top = select_largest("top rated movies", scored, n)?;
    debug!(selected = top.len(), "selected top rated movies");
    Ok(top)
}

/// Movies whose critic and audience ratings differ by at least `threshold`,
/// largest gap first, at most `n` of them.
pub fn controversial(data: &Dataset, threshold: f64, n: usize) -> Result<Vec<RankedMovie>> {
    let scored = data
        .valid_ratings()
        .into_iter()
        .map(|r| (r.rating_diff(), r))
        .filter(|(diff, _)| *diff >= threshold)
        .collect();
    let picked = select_largest("rating discrepancies", scored, n)?;
    debug!(selected = picked.len(), threshold, "selected controversial movies");
    Ok(picked)
}

/// Rating trends per release year, ascending, for years with at least
/// `min_movies` records.
pub fn yearly_stats(data: &Dataset, min_movies: usize) -> Result<Vec<YearStat>> {
    const OP: &str = "yearly rating trends";
    let mut map: BTreeMap<i32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.release_year).or_default();
        e.0.push(r.critic_rating);
        e.1.push(r.audience_rating);
    }

    let years = map
        .into_iter()
        .filter(|(_, (critic, _))| critic.len() >= min_movies)
        .map(|(year, (critic, audience))| -> Result<YearStat> {
            let label = year.to_string();
            Ok(YearStat {
                year,
                critic: summarize(OP, &label, &critic)?,
                audience: summarize(OP, &label, &audience)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(years = years.len(), min_movies, "computed yearly rating trends");
    Ok(years)
}

/// Critic and audience rating summaries for the `limit` genres with the
/// highest mean critic rating among genres with at least `min_movies`
/// records.
pub fn genre_comparison(
    data: &Dataset,
    min_movies: usize,
    limit: usize,
) -> Result<Vec<GenreComparison>> {
    const OP: &str = "genre comparison";
    let mut map: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.genre.as_str()).or_default();
        e.0.push(r.critic_rating);
        e.1.push(r.audience_rating);
    }

    let mut genres = map
        .into_iter()
        .filter(|(_, (critic, _))| critic.len() >= min_movies)
        .map(|(genre, (critic, audience))| -> Result<GenreComparison> {
            Ok(GenreComparison {
                genre: genre.to_string(),
                critic: summarize(OP, genre, &critic)?,
                audience: summarize(OP, genre, &audience)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    genres.sort_by(|a, b| b.critic.mean.partial_cmp(&a.critic.mean).unwrap_or(Ordering::Equal));
    genres.truncate(limit);
    Ok(genres)
}

/// Stable largest-`n` selection: equal keys keep their input order.
fn select_largest(
    operation: &'static str,
    mut scored: Vec<(f64, &MovieRecord)>,
    n: usize,
) -> Result<Vec<RankedMovie>> {
    if let Some((_, bad)) = scored.iter().find(|(key, _)| !key.is_finite()) {
        return Err(aggregation_error(
            operation,
            format!("non-finite ranking key for '{}'", bad.title),
        ));
    }
    // `sort_by` is stable, and with finite keys `partial_cmp` never fails.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    Ok(scored
        .into_iter()
        .take(n)
        .map(|(score, movie)| RankedMovie {
            movie: movie.clone(),
            score,
        })
        .collect())
}

fn summarize(operation: &'static str, group: &str, values: &[f64]) -> Result<RatingSummary> {
    Ok(RatingSummary {
        mean: finite(operation, group, average(values))?,
        std_dev: finite(operation, group, sample_std_dev(values))?,
        count: values.len(),
    })
}

fn finite(operation: &'static str, group: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(aggregation_error(operation, format!("non-finite value for '{group}'")))
    }
}

fn aggregation_error(operation: &'static str, reason: String) -> InsightsError {
    error!(operation, %reason, "aggregation failed");
    InsightsError::Aggregation { operation, reason }
}
