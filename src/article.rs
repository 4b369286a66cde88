use chrono::{DateTime, Utc};
use serde::Serialize;

/// One normalized feed entry, tagged with the source it came from.
///
/// `source` and `tags` always come from the registry entry that produced the
/// article, never from the feed payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Date text as the feed supplied it
    #[serde(rename = "published")]
    pub published_raw: Option<String>,
    #[serde(rename = "published_parsed")]
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub tags: Vec<String>,
}

impl Article {
    /// Case-insensitive exact tag match.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// An article with its score attached. Only built while answering a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: f64,
}
