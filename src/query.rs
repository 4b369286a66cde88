//! Read-side queries over a store snapshot.
//!
//! All three queries sort stably, so equal keys keep store order. With the
//! default base score every score is zero and the score-ranked views fall
//! back to fetch order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::article::{Article, ScoredArticle};
use crate::score::{score, DEFAULT_BASE_SCORE};

pub const DEFAULT_LIMIT: i64 = 50;

/// Highest score first, at most `limit` articles.
pub fn top_by_score(articles: &[Article], limit: i64) -> Vec<ScoredArticle> {
    rank(articles.iter(), limit)
}

/// Newest first. Undated articles sort as if published at the epoch.
pub fn latest(articles: &[Article], limit: i64) -> Vec<Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));

    sorted
        .into_iter()
        .take(clamp_limit(limit))
        .cloned()
        .collect()
}

/// Articles carrying `tag` (any case), ranked like [`top_by_score`].
pub fn by_tag(articles: &[Article], tag: &str, limit: i64) -> Vec<ScoredArticle> {
    rank(articles.iter().filter(|a| a.has_tag(tag)), limit)
}

fn rank<'a>(articles: impl Iterator<Item = &'a Article>, limit: i64) -> Vec<ScoredArticle> {
    let limit = clamp_limit(limit);
    if limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredArticle> = articles
        .map(|article| ScoredArticle {
            score: score(article, DEFAULT_BASE_SCORE),
            article: article.clone(),
        })
        .collect();

    scored.sort_by(|a, b| descending(a.score, b.score));
    scored.truncate(limit);
    scored
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn sort_key(article: &Article) -> DateTime<Utc> {
    article.published_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}
