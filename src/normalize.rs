//! Field Normalizer: retypes date and numeric columns.
//!
//! Unparseable cells become MISSING (`None`); rows are never dropped here.
//! The only failure is a column the pipeline depends on being absent.

use crate::error::{InsightsError, Result};
use crate::loader::RawTable;
use crate::types::{
    NormalizedRecord, COL_AUDIENCE_COUNT, COL_AUDIENCE_RATING, COL_CRITIC_COUNT,
    COL_CRITIC_RATING, COL_GENRE, COL_RELEASE_DATE, COL_RUNTIME, COL_TITLE,
};
use crate::util::{parse_count_safe, parse_f64_safe, parse_year_safe};
use tracing::debug;

pub fn normalize(raw: &RawTable) -> Result<Vec<NormalizedRecord>> {
    let titles = text_column(raw, COL_TITLE)?;
    let years = convert_dates(raw)?;
    let [critic, audience, runtime] = convert_numeric_columns(raw)?;
    let genres = text_column(raw, COL_GENRE)?;
    let critic_counts = count_column(raw, COL_CRITIC_COUNT)?;
    let audience_counts = count_column(raw, COL_AUDIENCE_COUNT)?;

    let records = (0..raw.len())
        .map(|i| NormalizedRecord {
            title: titles[i].clone().unwrap_or_default(),
            release_year: years[i],
            critic_rating: critic[i],
            audience_rating: audience[i],
            runtime_minutes: runtime[i],
            genre: genres[i].clone(),
            critic_vote_count: critic_counts[i],
            audience_vote_count: audience_counts[i],
        })
        .collect();
    Ok(records)
}

/// Release date to calendar year.
pub fn convert_dates(raw: &RawTable) -> Result<Vec<Option<i32>>> {
    let years: Vec<Option<i32>> = require_column(raw, COL_RELEASE_DATE)?
        .map(parse_year_safe)
        .collect();
    debug!(
        missing = years.iter().filter(|y| y.is_none()).count(),
        "converted release dates"
    );
    Ok(years)
}

/// Critic rating, audience rating and runtime, in that order.
pub fn convert_numeric_columns(raw: &RawTable) -> Result<[Vec<Option<f64>>; 3]> {
    let convert = |name: &'static str| -> Result<Vec<Option<f64>>> {
        let values: Vec<Option<f64>> = require_column(raw, name)?.map(parse_f64_safe).collect();
        debug!(
            column = name,
            missing = values.iter().filter(|v| v.is_none()).count(),
            "converted numeric column"
        );
        Ok(values)
    };
    Ok([
        convert(COL_CRITIC_RATING)?,
        convert(COL_AUDIENCE_RATING)?,
        convert(COL_RUNTIME)?,
    ])
}

fn text_column(raw: &RawTable, name: &str) -> Result<Vec<Option<String>>> {
    Ok(require_column(raw, name)?
        .map(|cell| cell.map(|s| s.trim().to_string()))
        .collect())
}

fn count_column(raw: &RawTable, name: &str) -> Result<Vec<u64>> {
    Ok(require_column(raw, name)?
        .map(|cell| parse_count_safe(cell).unwrap_or(0))
        .collect())
}

fn require_column<'a>(
    raw: &'a RawTable,
    name: &str,
) -> Result<impl Iterator<Item = Option<&'a str>> + 'a> {
    raw.column(name).ok_or_else(|| InsightsError::Normalization {
        column: name.to_string(),
    })
}
