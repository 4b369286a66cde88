//! Time-decay scoring.
//!
//! `score = (base - 1) / (age_hours + 2) ^ GRAVITY`, the gravity formula used
//! by link aggregators. Every caller currently passes [`DEFAULT_BASE_SCORE`],
//! so scores are uniformly zero until a weighting signal (votes) feeds `base`.

use chrono::{DateTime, Utc};

use crate::article::Article;

/// Exponent controlling how fast scores decay with age.
pub const GRAVITY: f64 = 1.8;

pub const DEFAULT_BASE_SCORE: f64 = 1.0;

/// Lower bound for `age_hours + 2`; entries dated two or more hours in the
/// future would otherwise divide by zero or raise a negative base to a
/// fractional power.
const MIN_DECAY_BASE: f64 = 1e-9;

/// Score an article against the current wall clock.
pub fn score(article: &Article, base_score: f64) -> f64 {
    score_at(article, base_score, Utc::now())
}

/// Score an article as of `now`. Undated articles score exactly `0.0`.
pub fn score_at(article: &Article, base_score: f64, now: DateTime<Utc>) -> f64 {
    let Some(published_at) = article.published_at else {
        return 0.0;
    };

    let age_hours = (now - published_at).num_milliseconds() as f64 / 3_600_000.0;
    let decay = (age_hours + 2.0).max(MIN_DECAY_BASE).powf(GRAVITY);

    (base_score - 1.0) / decay
}
