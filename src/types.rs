use serde::Serialize;
use tabled::Tabled;

pub const COL_TITLE: &str = "movie_title";
pub const COL_RELEASE_DATE: &str = "in_theaters_date";
pub const COL_CRITIC_RATING: &str = "tomatometer_rating";
pub const COL_AUDIENCE_RATING: &str = "audience_rating";
pub const COL_RUNTIME: &str = "runtime_in_minutes";
pub const COL_GENRE: &str = "genre";
pub const COL_CRITIC_COUNT: &str = "tomatometer_count";
pub const COL_AUDIENCE_COUNT: &str = "audience_count";

/// Columns the pipeline reads. Any other source column is carried by the
/// loader but ignored downstream.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_TITLE,
    COL_RELEASE_DATE,
    COL_CRITIC_RATING,
    COL_AUDIENCE_RATING,
    COL_RUNTIME,
    COL_GENRE,
    COL_CRITIC_COUNT,
    COL_AUDIENCE_COUNT,
];

pub const UNKNOWN_GENRE: &str = "Unknown";

/// A movie after field normalization. `None` is the MISSING marker: the
/// source cell was absent or could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub title: String,
    pub release_year: Option<i32>,
    pub critic_rating: Option<f64>,
    pub audience_rating: Option<f64>,
    pub runtime_minutes: Option<f64>,
    pub genre: Option<String>,
    pub critic_vote_count: u64,
    pub audience_vote_count: u64,
}

/// A movie that passed the validity filter. Every numeric field is present
/// and inside its configured domain.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub release_year: i32,
    pub critic_rating: f64,
    pub audience_rating: f64,
    pub runtime_minutes: f64,
    pub genre: String,
    pub critic_vote_count: u64,
    pub audience_vote_count: u64,
}

impl MovieRecord {
    /// Both ratings lie in [0, 100].
    pub fn has_valid_ratings(&self) -> bool {
        RATING_DOMAIN.contains(&self.critic_rating)
            && RATING_DOMAIN.contains(&self.audience_rating)
    }

    pub fn avg_rating(&self) -> f64 {
        (self.critic_rating + self.audience_rating) / 2.0
    }

    pub fn rating_diff(&self) -> f64 {
        (self.critic_rating - self.audience_rating).abs()
    }
}

const RATING_DOMAIN: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// The validated, read-only collection every downstream consumer shares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<MovieRecord>,
}

impl Dataset {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.records.iter()
    }

    /// Rows whose critic and audience ratings are both in [0, 100].
    ///
    /// Recomputed on every call instead of trusting the filter that built the
    /// dataset.
    pub fn valid_ratings(&self) -> Vec<&MovieRecord> {
        let rows: Vec<&MovieRecord> = self
            .records
            .iter()
            .filter(|r| r.has_valid_ratings())
            .collect();
        tracing::debug!(rows = rows.len(), "filtered rows with valid ratings");
        rows
    }

    /// Rows whose runtime lies in `0..=runtime_max`.
    pub fn valid_runtime(&self, runtime_max: f64) -> Vec<&MovieRecord> {
        let rows: Vec<&MovieRecord> = self
            .records
            .iter()
            .filter(|r| (0.0..=runtime_max).contains(&r.runtime_minutes))
            .collect();
        tracing::debug!(rows = rows.len(), "filtered rows with valid runtime");
        rows
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreStat {
    pub genre: String,
    pub avg_rating: f64,
    pub movie_count: usize,
    pub avg_runtime: f64,
}

/// A movie selected by a ranking, with the key it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMovie {
    pub movie: MovieRecord,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl RatingSummary {
    /// Half-width of the 95% confidence interval of the mean.
    pub fn ci95(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        1.96 * self.std_dev / (self.count as f64).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearStat {
    pub year: i32,
    pub critic: RatingSummary,
    pub audience: RatingSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreComparison {
    pub genre: String,
    pub critic: RatingSummary,
    pub audience: RatingSummary,
}

#[derive(Debug, Tabled, Clone)]
pub struct MovieRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Critics")]
    pub critics: String,
    #[tabled(rename = "Critics Votes")]
    pub critics_votes: String,
    #[tabled(rename = "Audience")]
    pub audience: String,
    #[tabled(rename = "Audience Votes")]
    pub audience_votes: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ControversyRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Critics")]
    pub critics: String,
    #[tabled(rename = "Critics Votes")]
    pub critics_votes: String,
    #[tabled(rename = "Audience")]
    pub audience: String,
    #[tabled(rename = "Audience Votes")]
    pub audience_votes: String,
    #[tabled(rename = "Difference")]
    pub difference: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct GenreRow {
    #[tabled(rename = "Genre")]
    pub genre: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Runtime")]
    pub runtime: String,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub genres_reported: usize,
    pub top_rated: usize,
    pub controversial: usize,
    pub report_path: String,
    pub charts_written: Vec<String>,
    pub charts_failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, critic: f64, audience: f64) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            release_year: 2000,
            critic_rating: critic,
            audience_rating: audience,
            runtime_minutes: 100.0,
            genre: "Drama".to_string(),
            critic_vote_count: 0,
            audience_vote_count: 0,
        }
    }

    #[test]
    fn test_valid_ratings_rechecks_domain() {
        let ds = Dataset::new(vec![
            movie("ok", 0.0, 100.0),
            movie("high", 101.0, 50.0),
            movie("low", 50.0, -0.5),
        ]);
        let valid = ds.valid_ratings();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].title, "ok");
    }

    #[test]
    fn test_valid_runtime() {
        let mut long = movie("long", 50.0, 50.0);
        long.runtime_minutes = 290.0;
        let ds = Dataset::new(vec![movie("short", 50.0, 50.0), long]);
        assert_eq!(ds.valid_runtime(280.0).len(), 1);
        assert_eq!(ds.valid_runtime(300.0).len(), 2);
    }

    #[test]
    fn test_derived_keys() {
        let m = movie("m", 90.0, 85.0);
        assert_eq!(m.avg_rating(), 87.5);
        assert_eq!(m.rating_diff(), 5.0);
    }

    #[test]
    fn test_ci95() {
        let s = RatingSummary {
            mean: 50.0,
            std_dev: 10.0,
            count: 4,
        };
        assert!((s.ci95() - 9.8).abs() < 1e-12);
    }
}
