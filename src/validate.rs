//! Validity Filter.
//!
//! Drops any record with a MISSING or out-of-range year, rating or runtime,
//! then defaults MISSING genres. Filtering runs first so a genre default can
//! never keep an otherwise invalid row.

use crate::config::AnalysisConfig;
use crate::error::{InsightsError, Result};
use crate::types::{Dataset, MovieRecord, NormalizedRecord, UNKNOWN_GENRE};
use std::ops::RangeInclusive;
use tracing::{debug, info};

type Predicate = fn(&NormalizedRecord, &AnalysisConfig) -> bool;

const RANGE_CHECKS: [(&str, Predicate); 4] = [
    ("release_year", year_in_range),
    ("critic_rating", critic_in_range),
    ("audience_rating", audience_in_range),
    ("runtime_minutes", runtime_in_range),
];

fn year_in_range(r: &NormalizedRecord, c: &AnalysisConfig) -> bool {
    within(r.release_year, &c.year_range)
}

fn critic_in_range(r: &NormalizedRecord, c: &AnalysisConfig) -> bool {
    within(r.critic_rating, &c.rating_range)
}

fn audience_in_range(r: &NormalizedRecord, c: &AnalysisConfig) -> bool {
    within(r.audience_rating, &c.rating_range)
}

fn runtime_in_range(r: &NormalizedRecord, c: &AnalysisConfig) -> bool {
    within(r.runtime_minutes, &c.runtime_range)
}

/// MISSING never satisfies a closed-interval check.
fn within<T: PartialOrd>(value: Option<T>, range: &RangeInclusive<T>) -> bool {
    value.is_some_and(|v| range.contains(&v))
}

pub fn is_valid(record: &NormalizedRecord, config: &AnalysisConfig) -> bool {
    RANGE_CHECKS.iter().all(|(_, check)| check(record, config))
}

/// Keep records passing every range check. Source order is preserved.
pub fn filter_valid_data(
    records: Vec<NormalizedRecord>,
    config: &AnalysisConfig,
) -> Vec<NormalizedRecord> {
    let before = records.len();
    for (name, check) in RANGE_CHECKS {
        let failing = records.iter().filter(|r| !check(r, config)).count();
        debug!(field = name, failing, "range check");
    }
    let kept: Vec<NormalizedRecord> = records.into_iter().filter(|r| is_valid(r, config)).collect();
    info!(kept = kept.len(), dropped = before - kept.len(), "filtered invalid records");
    kept
}

/// Default MISSING genres and seal the records into a [`Dataset`].
///
/// Expects input that already passed [`filter_valid_data`]; a MISSING numeric
/// field here is a structural error.
pub fn clean_genres(records: Vec<NormalizedRecord>) -> Result<Dataset> {
    let mut defaulted = 0usize;
    let movies = records
        .into_iter()
        .enumerate()
        .map(|(row, r)| -> Result<MovieRecord> {
            let genre = match r.genre {
                Some(g) if !g.is_empty() => g,
                _ => {
                    defaulted += 1;
                    UNKNOWN_GENRE.to_string()
                }
            };
            Ok(MovieRecord {
                release_year: required(row, "release_year", r.release_year)?,
                critic_rating: required(row, "critic_rating", r.critic_rating)?,
                audience_rating: required(row, "audience_rating", r.audience_rating)?,
                runtime_minutes: required(row, "runtime_minutes", r.runtime_minutes)?,
                title: r.title,
                genre,
                critic_vote_count: r.critic_vote_count,
                audience_vote_count: r.audience_vote_count,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(defaulted, "filled missing genres with '{}'", UNKNOWN_GENRE);
    Ok(Dataset::new(movies))
}

fn required<T>(row: usize, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| InsightsError::Validation {
        row,
        reason: format!("{field} is missing after range filtering"),
    })
}

pub fn validate(records: Vec<NormalizedRecord>, config: &AnalysisConfig) -> Result<Dataset> {
    clean_genres(filter_valid_data(records, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(
        year: Option<i32>,
        critic: Option<f64>,
        audience: Option<f64>,
        runtime: Option<f64>,
    ) -> NormalizedRecord {
        NormalizedRecord {
            title: "T".to_string(),
            release_year: year,
            critic_rating: critic,
            audience_rating: audience,
            runtime_minutes: runtime,
            genre: Some("Drama".to_string()),
            critic_vote_count: 0,
            audience_vote_count: 0,
        }
    }

    #[test]
    fn test_bounds_are_closed() {
        let cfg = AnalysisConfig::default();
        assert!(is_valid(&record(Some(1900), Some(0.0), Some(100.0), Some(0.0)), &cfg));
        assert!(is_valid(&record(Some(2024), Some(100.0), Some(0.0), Some(280.0)), &cfg));
        assert!(!is_valid(&record(Some(1899), Some(50.0), Some(50.0), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2025), Some(50.0), Some(50.0), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), Some(100.1), Some(50.0), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), Some(50.0), Some(-0.1), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), Some(50.0), Some(50.0), Some(280.5)), &cfg));
    }

    #[test]
    fn test_missing_fails_every_check() {
        let cfg = AnalysisConfig::default();
        assert!(!is_valid(&record(None, Some(50.0), Some(50.0), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), None, Some(50.0), Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), Some(50.0), None, Some(90.0)), &cfg));
        assert!(!is_valid(&record(Some(2000), Some(50.0), Some(50.0), None), &cfg));
    }

    #[test]
    fn test_runtime_bound_follows_config() {
        let legacy = AnalysisConfig::builder().runtime_max(300.0).build().unwrap();
        let r = record(Some(2000), Some(50.0), Some(50.0), Some(290.0));
        assert!(!is_valid(&r, &AnalysisConfig::default()));
        assert!(is_valid(&r, &legacy));
    }

    #[test]
    fn test_genre_default_never_rescues_invalid_row() {
        let mut bad = record(Some(2000), Some(120.0), Some(50.0), Some(90.0));
        bad.genre = None;
        let mut good = record(Some(2000), Some(60.0), Some(50.0), Some(90.0));
        good.genre = None;
        let ds = validate(vec![bad, good], &AnalysisConfig::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].critic_rating, 60.0);
        assert_eq!(ds.records()[0].genre, UNKNOWN_GENRE);
    }

    #[test]
    fn test_clean_genres_rejects_unfiltered_missing() {
        let err = clean_genres(vec![record(Some(2000), None, Some(1.0), Some(1.0))]).unwrap_err();
        assert!(matches!(err, InsightsError::Validation { row: 0, .. }));
    }

    #[test]
    fn test_filter_preserves_order() {
        let rows = vec![
            record(Some(2001), Some(1.0), Some(1.0), Some(1.0)),
            record(Some(1800), Some(1.0), Some(1.0), Some(1.0)),
            record(Some(2002), Some(1.0), Some(1.0), Some(1.0)),
        ];
        let kept = filter_valid_data(rows, &AnalysisConfig::default());
        let years: Vec<_> = kept.iter().map(|r| r.release_year).collect();
        assert_eq!(years, vec![Some(2001), Some(2002)]);
    }

    proptest! {
        #[test]
        fn prop_filter_is_conjunctive(
            rows in prop::collection::vec(
                (
                    prop::option::of(1850i32..2070),
                    prop::option::of(-20.0f64..120.0),
                    prop::option::of(-20.0f64..120.0),
                    prop::option::of(-10.0f64..320.0),
                ),
                0..60,
            )
        ) {
            let cfg = AnalysisConfig::default();
            let records: Vec<NormalizedRecord> = rows
                .iter()
                .map(|(y, c, a, rt)| record(*y, *c, *a, *rt))
                .collect();
            let expected: Vec<NormalizedRecord> = records
                .iter()
                .filter(|r| {
                    r.release_year.is_some_and(|y| (1900..=2024).contains(&y))
                        && r.critic_rating.is_some_and(|v| (0.0..=100.0).contains(&v))
                        && r.audience_rating.is_some_and(|v| (0.0..=100.0).contains(&v))
                        && r.runtime_minutes.is_some_and(|v| (0.0..=280.0).contains(&v))
                })
                .cloned()
                .collect();
            let ds = validate(records, &cfg).unwrap();
            prop_assert_eq!(ds.len(), expected.len());
            for (movie, src) in ds.iter().zip(&expected) {
                prop_assert_eq!(Some(movie.release_year), src.release_year);
                prop_assert_eq!(Some(movie.critic_rating), src.critic_rating);
                prop_assert_eq!(Some(movie.runtime_minutes), src.runtime_minutes);
            }
        }
    }
}
